//! Sequence definitions.

use serde::{Deserialize, Serialize};

/// A database sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,
    /// First value handed out.
    #[serde(default = "one")]
    pub initial_value: i64,
    /// Increment between values.
    #[serde(default = "one")]
    pub allocation_size: i64,
    /// Number of values cached by the server, if set.
    #[serde(default)]
    pub cache_size: Option<u32>,
}

const fn one() -> i64 {
    1
}

impl Sequence {
    /// Creates a sequence starting at 1 with increment 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_value: 1,
            allocation_size: 1,
            cache_size: None,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub const fn start(mut self, value: i64) -> Self {
        self.initial_value = value;
        self
    }

    /// Sets the increment.
    #[must_use]
    pub const fn increment(mut self, value: i64) -> Self {
        self.allocation_size = value;
        self
    }

    /// Sets the cache size.
    #[must_use]
    pub const fn cache(mut self, size: u32) -> Self {
        self.cache_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let seq: Sequence = serde_json::from_str(r#"{"name": "user_seq"}"#).unwrap();
        assert_eq!(seq, Sequence::new("user_seq"));
        assert_eq!(seq.initial_value, 1);
        assert_eq!(seq.allocation_size, 1);
    }
}
