//! Error types for SQL synthesis.
//!
//! Every fatal condition is detected before a statement list is returned,
//! so callers never observe a partially generated batch.

/// Errors that can occur while generating SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    /// The requested construct has no valid representation on the platform.
    #[error("{platform} does not support {feature}")]
    UnsupportedFeature {
        /// Name of the platform that rejected the construct.
        platform: &'static str,
        /// Description of the construct.
        feature: String,
    },

    /// A definition or diff references something that does not exist, or
    /// names collide.
    #[error("Structural inconsistency in '{object}': {message}")]
    StructuralInconsistency {
        /// The table, index, constraint or query the problem was found in.
        object: String,
        /// What is inconsistent.
        message: String,
    },

    /// A structural object is incomplete for SQL generation.
    #[error("Invalid definition of '{object}': {message}")]
    InvalidDefinition {
        /// The object that is incomplete.
        object: String,
        /// What is missing or malformed.
        message: String,
    },
}

impl SynthError {
    /// Creates an [`SynthError::UnsupportedFeature`].
    pub fn unsupported(platform: &'static str, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            platform,
            feature: feature.into(),
        }
    }

    /// Creates a [`SynthError::StructuralInconsistency`].
    pub fn inconsistent(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralInconsistency {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Creates a [`SynthError::InvalidDefinition`].
    pub fn invalid(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            object: object.into(),
            message: message.into(),
        }
    }
}

/// Result type for SQL synthesis.
pub type Result<T> = std::result::Result<T, SynthError>;
