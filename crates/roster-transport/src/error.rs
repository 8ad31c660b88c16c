//! Boundary errors and their wire failure classes.

use roster_core::IdentityKind;

use crate::handle::HandleError;

pub const FAILURE_TRANSPORT_INVALID_REQUEST: &str = "transport_invalid_request";
pub const FAILURE_TRANSPORT_UNKNOWN_ACTION: &str = "transport_unknown_action";
pub const FAILURE_TRANSPORT_INVALID_PAYLOAD: &str = "transport_invalid_payload";
pub const FAILURE_HANDLE_UNKNOWN: &str = "handle_unknown";
pub const FAILURE_HANDLE_STALE: &str = "handle_stale";
pub const FAILURE_KEY_KIND_MISMATCH: &str = "key_kind_mismatch";
pub const FAILURE_IDENTITY_UNSUPPORTED: &str = "identity_unsupported";

/// A contract violation at the call boundary.
///
/// Nothing the core does can fail; these only describe requests the
/// boundary refuses to forward.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid transport request: {0}")]
    InvalidRequest(String),

    #[error("unsupported transport action: {0}")]
    UnknownAction(String),

    #[error("invalid {action} payload: {message}")]
    InvalidPayload {
        action: &'static str,
        message: String,
    },

    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error("{identity} registry cannot be addressed by key {key}")]
    KeyKindMismatch { identity: IdentityKind, key: String },

    #[error("{action} is not supported by {identity} registries")]
    IdentityUnsupported {
        action: &'static str,
        identity: IdentityKind,
    },
}

impl TransportError {
    /// Stable snake_case class reported in `failureClasses`.
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => FAILURE_TRANSPORT_INVALID_REQUEST,
            Self::UnknownAction(_) => FAILURE_TRANSPORT_UNKNOWN_ACTION,
            Self::InvalidPayload { .. } => FAILURE_TRANSPORT_INVALID_PAYLOAD,
            Self::Handle(HandleError::Unknown(_)) => FAILURE_HANDLE_UNKNOWN,
            Self::Handle(HandleError::Stale(_)) => FAILURE_HANDLE_STALE,
            Self::KeyKindMismatch { .. } => FAILURE_KEY_KIND_MISMATCH,
            Self::IdentityUnsupported { .. } => FAILURE_IDENTITY_UNSUPPORTED,
        }
    }
}
