//! # roster-transport
//!
//! The call boundary between a UI layer and the roster core.
//!
//! A caller owns one [`Session`] and talks to it with JSON requests:
//!
//! ```text
//! {"action": "registry.add_string", "payload": {"handle": 4294967296, "text": "Alpha"}}
//!     │  parse, look up action row
//! Session ── HandleTable<Counter>, HandleTable<RegistryInstance>
//!     │  run, wrap in envelope
//! {"schema": 1, "result": "accepted", "action": ..., "len": 1, ...}
//! ```
//!
//! Every response carries the action's id and a semantic digest. Contract
//! violations (bad JSON, unknown action, stale handle, wrong key kind) come
//! back as `rejected` envelopes; dispatch never panics on caller input.
//!
//! The same dispatch is exported over a C ABI (see [`ffi`]).

pub mod check;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod session;

pub use check::{CheckIssue, CheckReport, transport_check};
pub use error::TransportError;
pub use handle::{Handle, HandleError, HandleTable};
pub use session::{EntryRow, KEY_NOT_FOUND, RegistryInstance, RegistryKey, Session};

use roster_core::IdentityKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

pub const GREETING: &str = "Hello from roster";

const TRANSPORT_DISPATCH_KIND: &str = "roster.transport_dispatch.v1";
const TRANSPORT_PROFILE_ID: &str = "transport.roster.v1";
const TRANSPORT_SEMANTIC_DIGEST_PREFIX: &str = "rs1_";
const ACTION_ID_TRANSPORT_INVALID_REQUEST: &str = "transport.action.invalid_request";
const ACTION_ID_TRANSPORT_UNKNOWN: &str = "transport.action.unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportActionId {
    SessionGreeting,
    CounterCreate,
    CounterIncrement,
    CounterGet,
    CounterReset,
    CounterDelete,
    RegistryCreate,
    RegistryAddString,
    RegistryRemoveLast,
    RegistryRemove,
    RegistryDuplicate,
    RegistryFormatted,
    RegistryKeyAt,
    RegistryEntries,
    RegistryDelete,
}

impl TransportActionId {
    fn as_str(self) -> &'static str {
        match self {
            Self::SessionGreeting => "transport.action.session_greeting",
            Self::CounterCreate => "transport.action.counter_create",
            Self::CounterIncrement => "transport.action.counter_increment",
            Self::CounterGet => "transport.action.counter_get",
            Self::CounterReset => "transport.action.counter_reset",
            Self::CounterDelete => "transport.action.counter_delete",
            Self::RegistryCreate => "transport.action.registry_create",
            Self::RegistryAddString => "transport.action.registry_add_string",
            Self::RegistryRemoveLast => "transport.action.registry_remove_last",
            Self::RegistryRemove => "transport.action.registry_remove",
            Self::RegistryDuplicate => "transport.action.registry_duplicate",
            Self::RegistryFormatted => "transport.action.registry_formatted",
            Self::RegistryKeyAt => "transport.action.registry_key_at",
            Self::RegistryEntries => "transport.action.registry_entries",
            Self::RegistryDelete => "transport.action.registry_delete",
        }
    }
}

/// What kind of instance an action's `handle` must name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    Session,
    Counter,
    Registry,
}

/// One dispatchable action and the native call it stands for.
#[derive(Debug, Clone, Copy)]
struct ActionBinding {
    id: TransportActionId,
    action: &'static str,
    /// Operation name on the native call surface the UI binds to.
    operation: &'static str,
    target: InstanceKind,
    mutates: bool,
}

const fn bind(
    id: TransportActionId,
    action: &'static str,
    operation: &'static str,
    target: InstanceKind,
    mutates: bool,
) -> ActionBinding {
    ActionBinding {
        id,
        action,
        operation,
        target,
        mutates,
    }
}

use InstanceKind::{Counter as C, Registry as R, Session as S};
use TransportActionId as Id;

static ACTION_BINDINGS: [ActionBinding; 15] = [
    bind(Id::SessionGreeting, "session.greeting", "stringFromNative", S, false),
    bind(Id::CounterCreate, "counter.create", "createCounter", C, true),
    bind(Id::CounterIncrement, "counter.increment", "incrementCounter", C, true),
    bind(Id::CounterGet, "counter.get", "getCounterValue", C, false),
    bind(Id::CounterReset, "counter.reset", "resetCounter", C, true),
    bind(Id::CounterDelete, "counter.delete", "deleteCounter", C, true),
    bind(Id::RegistryCreate, "registry.create", "createRegistry", R, true),
    bind(Id::RegistryAddString, "registry.add_string", "addString", R, true),
    bind(Id::RegistryRemoveLast, "registry.remove_last", "removeLastString", R, true),
    bind(Id::RegistryRemove, "registry.remove", "removeSpecificString", R, true),
    bind(Id::RegistryDuplicate, "registry.duplicate", "duplicateString", R, true),
    bind(Id::RegistryFormatted, "registry.formatted", "getFormattedString", R, false),
    bind(Id::RegistryKeyAt, "registry.key_at", "getKeyAtPosition", R, false),
    bind(Id::RegistryEntries, "registry.entries", "getEntries", R, false),
    bind(Id::RegistryDelete, "registry.delete", "deleteRegistry", R, true),
];

fn action_binding(action: &str) -> Option<&'static ActionBinding> {
    let action = action.trim();
    ACTION_BINDINGS.iter().find(|binding| binding.action == action)
}

fn semantic_digest(material: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in material {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{TRANSPORT_SEMANTIC_DIGEST_PREFIX}{:x}", hasher.finalize())
}

fn transport_dispatch_digest(action: &str, action_id: &str) -> String {
    semantic_digest(&[TRANSPORT_PROFILE_ID, TRANSPORT_DISPATCH_KIND, action, action_id])
}

/// A row of the action listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRow {
    pub action: &'static str,
    pub action_id: &'static str,
    pub operation: &'static str,
    pub instance_kind: InstanceKind,
    pub mutates: bool,
}

/// Every dispatchable action, in table order.
pub fn action_rows() -> Vec<ActionRow> {
    ACTION_BINDINGS
        .iter()
        .map(|binding| ActionRow {
            action: binding.action,
            action_id: binding.id.as_str(),
            operation: binding.operation,
            instance_kind: binding.target,
            mutates: binding.mutates,
        })
        .collect()
}

// ── Dispatch ──

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDispatchRequest {
    pub action: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CounterCreateRequest {
    #[serde(default)]
    initial: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandleRequest {
    handle: Handle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryCreateRequest {
    #[serde(default)]
    identity: IdentityKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddStringRequest {
    handle: Handle,
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyedRequest {
    handle: Handle,
    key: RegistryKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyAtRequest {
    handle: Handle,
    index: i64,
}

fn transport_rejected(action: &str, action_id: &str, err: &TransportError) -> Value {
    tracing::warn!(
        action,
        failure_class = err.failure_class(),
        "transport request rejected: {err}"
    );
    json!({
        "schema": 1,
        "dispatchKind": TRANSPORT_DISPATCH_KIND,
        "profileId": TRANSPORT_PROFILE_ID,
        "result": "rejected",
        "action": action,
        "actionId": action_id,
        "semanticDigest": transport_dispatch_digest(action, action_id),
        "failureClasses": [err.failure_class()],
        "diagnostic": err.to_string(),
    })
}

fn transport_accepted(binding: &ActionBinding, fields: Value) -> Value {
    let action_id = binding.id.as_str();
    let mut envelope = json!({
        "schema": 1,
        "dispatchKind": TRANSPORT_DISPATCH_KIND,
        "profileId": TRANSPORT_PROFILE_ID,
        "result": "accepted",
        "action": binding.action,
        "actionId": action_id,
        "semanticDigest": transport_dispatch_digest(binding.action, action_id),
    });
    if let (Some(obj), Value::Object(extra)) = (envelope.as_object_mut(), fields) {
        obj.extend(extra);
    }
    envelope
}

/// Rejected envelope for a request that could not even be read.
pub fn invalid_request_json(diagnostic: impl Into<String>) -> String {
    transport_rejected(
        "transport.dispatch",
        ACTION_ID_TRANSPORT_INVALID_REQUEST,
        &TransportError::InvalidRequest(diagnostic.into()),
    )
    .to_string()
}

fn parse_payload<T: DeserializeOwned>(
    binding: &ActionBinding,
    payload: Value,
) -> Result<T, TransportError> {
    let payload = if payload.is_null() {
        Value::Object(Map::new())
    } else {
        payload
    };
    serde_json::from_value(payload).map_err(|source| TransportError::InvalidPayload {
        action: binding.action,
        message: source.to_string(),
    })
}

impl Session {
    /// Run one request. Rejections are returned as envelopes, never as panics.
    pub fn dispatch(&mut self, request: TransportDispatchRequest) -> Value {
        let Some(binding) = action_binding(&request.action) else {
            let action = request.action.trim();
            return transport_rejected(
                action,
                ACTION_ID_TRANSPORT_UNKNOWN,
                &TransportError::UnknownAction(action.to_string()),
            );
        };
        tracing::debug!(action = binding.action, "transport dispatch");
        match self.dispatch_action(binding, request.payload) {
            Ok(fields) => transport_accepted(binding, fields),
            Err(err) => transport_rejected(binding.action, binding.id.as_str(), &err),
        }
    }

    /// Parse `request_json`, dispatch it, and serialize the envelope.
    pub fn dispatch_json(&mut self, request_json: &str) -> String {
        match serde_json::from_str::<TransportDispatchRequest>(request_json) {
            Ok(request) => self.dispatch(request).to_string(),
            Err(source) => invalid_request_json(source.to_string()),
        }
    }

    fn dispatch_action(
        &mut self,
        binding: &ActionBinding,
        payload: Value,
    ) -> Result<Value, TransportError> {
        match binding.id {
            TransportActionId::SessionGreeting => Ok(json!({ "text": GREETING })),
            TransportActionId::CounterCreate => {
                let request: CounterCreateRequest = parse_payload(binding, payload)?;
                let handle = self.create_counter(request.initial);
                Ok(json!({ "handle": handle, "value": request.initial }))
            }
            TransportActionId::CounterIncrement => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let value = self.increment_counter(request.handle)?;
                Ok(json!({ "value": value }))
            }
            TransportActionId::CounterGet => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let value = self.counter_value(request.handle)?;
                Ok(json!({ "value": value }))
            }
            TransportActionId::CounterReset => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let value = self.reset_counter(request.handle)?;
                Ok(json!({ "value": value }))
            }
            TransportActionId::CounterDelete => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                self.delete_counter(request.handle)?;
                Ok(json!({}))
            }
            TransportActionId::RegistryCreate => {
                let request: RegistryCreateRequest = parse_payload(binding, payload)?;
                let handle = self.create_registry(request.identity);
                Ok(json!({ "handle": handle, "identity": request.identity }))
            }
            TransportActionId::RegistryAddString => {
                let request: AddStringRequest = parse_payload(binding, payload)?;
                let len = self.add_string(request.handle, &request.text)?;
                Ok(json!({ "len": len }))
            }
            TransportActionId::RegistryRemoveLast => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let len = self.remove_last_string(request.handle)?;
                Ok(json!({ "len": len }))
            }
            TransportActionId::RegistryRemove => {
                let request: KeyedRequest = parse_payload(binding, payload)?;
                let changed = self.remove_specific_string(request.handle, &request.key)?;
                let len = self.registry(request.handle)?.len();
                Ok(json!({ "len": len, "changed": changed }))
            }
            TransportActionId::RegistryDuplicate => {
                let request: KeyedRequest = parse_payload(binding, payload)?;
                let changed = self.duplicate_string(request.handle, &request.key)?;
                let len = self.registry(request.handle)?.len();
                Ok(json!({ "len": len, "changed": changed }))
            }
            TransportActionId::RegistryFormatted => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let text = self.formatted_string(request.handle)?;
                Ok(json!({ "text": text }))
            }
            TransportActionId::RegistryKeyAt => {
                let request: KeyAtRequest = parse_payload(binding, payload)?;
                let key = self.key_at_position(request.handle, request.index)?;
                Ok(json!({ "key": key }))
            }
            TransportActionId::RegistryEntries => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                let entries = self.entries(request.handle)?;
                Ok(json!({ "entries": entries }))
            }
            TransportActionId::RegistryDelete => {
                let request: HandleRequest = parse_payload(binding, payload)?;
                self.delete_registry(request.handle)?;
                Ok(json!({}))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FAILURE_TRANSPORT_INVALID_REQUEST;

    fn send(session: &mut Session, action: &str, payload: Value) -> Value {
        let request = json!({ "action": action, "payload": payload }).to_string();
        serde_json::from_str(&session.dispatch_json(&request)).expect("response is JSON")
    }

    #[test]
    fn every_action_resolves_to_its_own_binding() {
        for binding in &ACTION_BINDINGS {
            let found = action_binding(&format!(" {} ", binding.action))
                .expect("action resolves");
            assert_eq!(found.id, binding.id);
        }
        assert!(action_binding("counter.explode").is_none());
    }

    #[test]
    fn action_rows_list_native_operations_once() {
        let rows = action_rows();
        assert_eq!(rows.len(), ACTION_BINDINGS.len());
        let mut operations: Vec<_> = rows.iter().map(|row| row.operation).collect();
        operations.sort_unstable();
        operations.dedup();
        assert_eq!(operations.len(), rows.len());
        let key_at = rows
            .iter()
            .find(|row| row.action == "registry.key_at")
            .expect("key_at is listed");
        assert_eq!(key_at.instance_kind, InstanceKind::Registry);
        assert!(!key_at.mutates);
    }

    #[test]
    fn accepted_envelope_carries_digest_and_fields() {
        let mut session = Session::new();
        let response = send(&mut session, "session.greeting", Value::Null);
        assert_eq!(response["result"], "accepted");
        assert_eq!(response["actionId"], "transport.action.session_greeting");
        assert_eq!(response["text"], GREETING);
        assert_eq!(
            response["semanticDigest"],
            transport_dispatch_digest("session.greeting", "transport.action.session_greeting")
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut session = Session::new();
        let response = send(&mut session, "registry.sort", json!({}));
        assert_eq!(response["result"], "rejected");
        assert_eq!(response["failureClasses"], json!(["transport_unknown_action"]));
        assert_eq!(response["actionId"], ACTION_ID_TRANSPORT_UNKNOWN);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut session = Session::new();
        let response: Value =
            serde_json::from_str(&session.dispatch_json("{not json")).expect("response is JSON");
        assert_eq!(response["result"], "rejected");
        assert_eq!(response["failureClasses"], json!([FAILURE_TRANSPORT_INVALID_REQUEST]));
    }

    #[test]
    fn missing_payload_field_is_invalid_payload() {
        let mut session = Session::new();
        let response = send(&mut session, "registry.add_string", json!({ "text": "x" }));
        assert_eq!(response["failureClasses"], json!(["transport_invalid_payload"]));
        assert_eq!(response["action"], "registry.add_string");
    }

    #[test]
    fn counter_create_defaults_initial_to_zero() {
        let mut session = Session::new();
        let response = send(&mut session, "counter.create", Value::Null);
        assert_eq!(response["value"], 0);
        let handle = response["handle"].as_u64().expect("handle is u64");
        assert_ne!(handle, 0);
    }
}
