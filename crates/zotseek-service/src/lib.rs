pub mod credentials;
pub mod launcher;
pub mod orchestrator;

pub use credentials::ApiKeyLookup;
pub use launcher::Launcher;
pub use orchestrator::SearchService;
