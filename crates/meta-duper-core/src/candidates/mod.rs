pub mod filter;
pub mod source;

pub use filter::NameFilter;
pub use source::CandidateSource;

/// The fixed, sorted list of names every later phase addresses by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    names: Vec<String>,
    skipped: Vec<String>,
}

impl CandidateList {
    pub fn new(names: Vec<String>, skipped: Vec<String>) -> Self {
        Self { names, skipped }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names dropped by an excluded pattern, sorted.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}
