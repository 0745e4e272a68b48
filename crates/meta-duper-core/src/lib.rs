pub mod audit_log;
pub mod candidates;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod keeper;
pub mod matcher;
pub mod metadata;
pub mod progress;
pub mod removal;
pub mod resolve;

pub use candidates::{CandidateList, CandidateSource};
pub use config::AppConfig;
pub use engine::{DedupeEngine, DedupeReport};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use resolve::{Decision, Resolution};
