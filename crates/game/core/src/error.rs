//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (e.g., `MoveError`, `AttackError`, `PathError`) are
//! defined in their respective modules alongside the operations they guard.
//! This module provides the shared classification they all report through.
//!
//! # Severity and the failure taxonomy
//!
//! - An illegal action is a validation failure: the pipeline drops or retries
//!   it and nothing surfaces to the player.
//! - An unreachable target is not an error at all; searches return an empty
//!   path and the line-of-sight check returns `true`.
//! - A coordinate that resolves to no tile is an internal precondition
//!   violation of the caller.
//! - An unknown enumerated value coming from content is fatal.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the same request may succeed once the level changes.
    ///
    /// Examples: destination occupied, no free start tile
    Recoverable,

    /// Validation error - invalid request, should not retry without changes.
    ///
    /// Examples: destination not adjacent, target out of reach
    Validation,

    /// Internal error - a caller broke a precondition.
    ///
    /// Examples: search coordinates outside the tile field, occupancy desync
    Internal,

    /// Fatal error - content or construction data is corrupt.
    ///
    /// Examples: unknown enemy kind, level with no tiles
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_covers_fatal() {
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
    }
}
