use std::io;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// stderr, else stdout, else the exit code.
    pub fn failure_detail(&self) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match self.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Run to completion with stdin closed, capturing both output streams.
pub fn run(cmd: &mut Command) -> io::Result<ProcessOutput> {
    debug!(program = ?cmd.get_program(), "spawning");
    let output = cmd.stdin(Stdio::null()).output()?;
    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
