use std::fmt;

/// Identifier of one worker in the audit pool (1-based when displayed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct WorkerId(usize);

impl WorkerId {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}
