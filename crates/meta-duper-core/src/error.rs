use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Audit log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Candidate listing failed: {0}")]
    CandidateSource(String),

    #[error("{0} candidate(s) claimed as removable by more than one cluster; refusing to delete")]
    ClusterConflict(usize),
}
