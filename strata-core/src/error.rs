//! Graph Errors
//!
//! Every rejected operation surfaces a [`DagError`]. Errors are raised at the
//! point of the offending call and the graph is left exactly as it was before
//! the call.

use std::fmt;

/// Machine-readable error codes for the graph's failure conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DuplicateKey,
    CycleDetected,
    UnknownKey,
    InvalidArgument,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateKey => "E1001",
            Self::CycleDetected => "E1002",
            Self::UnknownKey => "E1003",
            Self::InvalidArgument => "E1004",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DuplicateKey => "Key already present",
            Self::CycleDetected => "Cycle would be created",
            Self::UnknownKey => "Key not found",
            Self::InvalidArgument => "Invalid argument",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DuplicateKey => Some("Remove the existing node before inserting it again."),
            Self::CycleDetected => Some("Drop one of the dependencies to keep the graph acyclic."),
            Self::UnknownKey => None,
            Self::InvalidArgument => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors returned by [`Dag`](crate::graph::Dag) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DagError<K> {
    /// A node with this key is already in the graph.
    #[error("duplicate key {0:?}")]
    DuplicateKey(K),

    /// Inserting `key` would close a cycle running from `key` through
    /// `through` and back.
    ///
    /// For a self-loop `through` equals `key`.
    #[error("inserting {key:?} would close a cycle through {through:?}")]
    CycleDetected { key: K, through: K },

    /// No node with this key exists.
    #[error("unknown key {0:?}")]
    UnknownKey(K),

    /// The call itself was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl<K> DagError<K> {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateKey(_) => ErrorCode::DuplicateKey,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::UnknownKey(_) => ErrorCode::UnknownKey,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Result type for graph operations.
pub type Result<T, K> = std::result::Result<T, DagError<K>>;
