//! Error types for roster core.

/// An identity scheme name that is neither `value` nor `synthetic`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identity scheme: {0} (expected `value` or `synthetic`)")]
pub struct UnknownIdentityKind(pub String);
