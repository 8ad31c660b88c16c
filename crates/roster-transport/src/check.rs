//! Self-check of the dispatch surface.
//!
//! [`transport_check`] drives a scratch [`Session`] through every action with
//! JSON requests, the same way a UI host would, and compares each response
//! with the behavior that host relies on: lowercased storage, the rendered
//! sentence, re-indexed keys, the `-1` sentinel, and rejection of stale or
//! mistyped handles and keys.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{
    FAILURE_HANDLE_STALE, FAILURE_HANDLE_UNKNOWN, FAILURE_IDENTITY_UNSUPPORTED,
    FAILURE_KEY_KIND_MISMATCH,
};
use crate::{ACTION_BINDINGS, GREETING, KEY_NOT_FOUND, Session, TRANSPORT_PROFILE_ID};

pub const FAILURE_CHECK_ACTION_REJECTED: &str = "check_action_rejected";
pub const FAILURE_CHECK_UNEXPECTED_VALUE: &str = "check_unexpected_value";
pub const FAILURE_CHECK_ACTION_NOT_EXERCISED: &str = "check_action_not_exercised";

const TRANSPORT_CHECK_KIND: &str = "roster.transport_check.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIssue {
    pub failure_class: &'static str,
    pub action: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub schema: u32,
    pub check_kind: &'static str,
    pub profile_id: &'static str,
    pub result: &'static str,
    pub failure_classes: Vec<&'static str>,
    pub issues: Vec<CheckIssue>,
    pub requests: usize,
    pub actions_exercised: usize,
    pub action_count: usize,
}

impl CheckReport {
    pub fn is_accepted(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run the dispatch self-check on a fresh session.
pub fn transport_check() -> CheckReport {
    let mut run = Run::new();
    exercise(&mut run);
    run.finish()
}

struct Run {
    session: Session,
    requests: usize,
    exercised: BTreeSet<String>,
    issues: Vec<CheckIssue>,
}

impl Run {
    fn new() -> Self {
        Self {
            session: Session::new(),
            requests: 0,
            exercised: BTreeSet::new(),
            issues: Vec::new(),
        }
    }

    fn send(&mut self, action: &str, payload: Value) -> Value {
        self.requests += 1;
        self.exercised.insert(action.to_string());
        let request = json!({ "action": action, "payload": payload }).to_string();
        serde_json::from_str(&self.session.dispatch_json(&request)).unwrap_or(Value::Null)
    }

    fn accepted(&mut self, action: &str, payload: Value) -> Value {
        let response = self.send(action, payload);
        if response["result"] != "accepted" {
            self.issue(
                FAILURE_CHECK_ACTION_REJECTED,
                action,
                format!("expected accepted, got {}", response["diagnostic"]),
            );
        }
        response
    }

    fn rejected(&mut self, action: &str, payload: Value, failure_class: &str) {
        let response = self.send(action, payload);
        if response["failureClasses"] != json!([failure_class]) {
            self.issue(
                FAILURE_CHECK_UNEXPECTED_VALUE,
                action,
                format!(
                    "expected rejection {failure_class}, got {} {}",
                    response["result"], response["failureClasses"]
                ),
            );
        }
    }

    fn expect(&mut self, action: &str, response: &Value, field: &str, want: Value) {
        if response[field] != want {
            self.issue(
                FAILURE_CHECK_UNEXPECTED_VALUE,
                action,
                format!("{field}: expected {want}, got {}", response[field]),
            );
        }
    }

    fn issue(&mut self, failure_class: &'static str, action: &str, message: String) {
        tracing::warn!(failure_class, action, "{message}");
        self.issues.push(CheckIssue {
            failure_class,
            action: action.to_string(),
            message,
        });
    }

    fn finish(mut self) -> CheckReport {
        self.issues.extend(unexercised(&self.exercised));
        let mut failure_classes: Vec<&'static str> =
            self.issues.iter().map(|issue| issue.failure_class).collect();
        failure_classes.sort_unstable();
        failure_classes.dedup();
        let actions_exercised = ACTION_BINDINGS
            .iter()
            .filter(|binding| self.exercised.contains(binding.action))
            .count();

        CheckReport {
            schema: 1,
            check_kind: TRANSPORT_CHECK_KIND,
            profile_id: TRANSPORT_PROFILE_ID,
            result: if self.issues.is_empty() { "accepted" } else { "rejected" },
            failure_classes,
            issues: self.issues,
            requests: self.requests,
            actions_exercised,
            action_count: ACTION_BINDINGS.len(),
        }
    }
}

fn unexercised(exercised: &BTreeSet<String>) -> Vec<CheckIssue> {
    ACTION_BINDINGS
        .iter()
        .filter(|binding| !exercised.contains(binding.action))
        .map(|binding| CheckIssue {
            failure_class: FAILURE_CHECK_ACTION_NOT_EXERCISED,
            action: binding.action.to_string(),
            message: format!("{} ({}) was never dispatched", binding.action, binding.operation),
        })
        .collect()
}

fn exercise(run: &mut Run) {
    let greeting = run.accepted("session.greeting", json!({}));
    run.expect("session.greeting", &greeting, "text", json!(GREETING));

    let created = run.accepted("counter.create", json!({ "initial": 10 }));
    run.expect("counter.create", &created, "value", json!(10));
    let counter = created["handle"].clone();
    let response = run.accepted("counter.increment", json!({ "handle": counter }));
    run.expect("counter.increment", &response, "value", json!(11));
    let response = run.accepted("counter.get", json!({ "handle": counter }));
    run.expect("counter.get", &response, "value", json!(11));
    let response = run.accepted("counter.reset", json!({ "handle": counter }));
    run.expect("counter.reset", &response, "value", json!(0));

    let created = run.accepted("registry.create", json!({ "identity": "synthetic" }));
    let list = created["handle"].clone();
    run.rejected("registry.formatted", json!({ "handle": counter }), FAILURE_HANDLE_UNKNOWN);
    run.rejected("counter.get", json!({ "handle": list }), FAILURE_HANDLE_UNKNOWN);

    for (index, word) in ["Alpha", "Beta", "GAMMA"].into_iter().enumerate() {
        let payload = json!({ "handle": list, "text": word });
        let response = run.accepted("registry.add_string", payload);
        run.expect("registry.add_string", &response, "len", json!(index + 1));
    }
    let response = run.accepted("registry.formatted", json!({ "handle": list }));
    run.expect("registry.formatted", &response, "text", json!("Alpha, beta, gamma"));

    let response = run.accepted("registry.key_at", json!({ "handle": list, "index": 1 }));
    run.expect("registry.key_at", &response, "key", json!(1));
    let response = run.accepted("registry.key_at", json!({ "handle": list, "index": 3 }));
    run.expect("registry.key_at", &response, "key", json!(KEY_NOT_FOUND));

    let response = run.accepted("registry.duplicate", json!({ "handle": list, "key": 1 }));
    run.expect("registry.duplicate", &response, "len", json!(4));
    let response = run.accepted("registry.remove", json!({ "handle": list, "key": 0 }));
    run.expect("registry.remove", &response, "changed", json!(true));
    let response = run.accepted("registry.remove", json!({ "handle": list, "key": 9 }));
    run.expect("registry.remove", &response, "changed", json!(false));
    run.expect("registry.remove", &response, "len", json!(3));

    let response = run.accepted("registry.entries", json!({ "handle": list }));
    let keys: Vec<Value> = response["entries"]
        .as_array()
        .map(|rows| rows.iter().map(|row| row["key"].clone()).collect())
        .unwrap_or_default();
    run.expect("registry.entries", &json!({ "keys": keys }), "keys", json!([0, 1, 2]));
    let response = run.accepted("registry.formatted", json!({ "handle": list }));
    run.expect("registry.formatted", &response, "text", json!("Beta, beta, gamma"));

    let response = run.accepted("registry.remove_last", json!({ "handle": list }));
    run.expect("registry.remove_last", &response, "len", json!(2));
    run.rejected(
        "registry.remove",
        json!({ "handle": list, "key": "beta" }),
        FAILURE_KEY_KIND_MISMATCH,
    );

    let created = run.accepted("registry.create", json!({ "identity": "value" }));
    let words = created["handle"].clone();
    run.accepted("registry.add_string", json!({ "handle": words, "text": "x" }));
    let response = run.accepted("registry.duplicate", json!({ "handle": words, "key": "X" }));
    run.expect("registry.duplicate", &response, "len", json!(2));
    run.rejected(
        "registry.key_at",
        json!({ "handle": words, "index": 0 }),
        FAILURE_IDENTITY_UNSUPPORTED,
    );

    run.accepted("registry.delete", json!({ "handle": words }));
    run.accepted("registry.delete", json!({ "handle": list }));
    run.rejected("registry.formatted", json!({ "handle": list }), FAILURE_HANDLE_STALE);
    run.accepted("counter.delete", json!({ "handle": counter }));
    run.rejected("counter.get", json!({ "handle": counter }), FAILURE_HANDLE_STALE);

    if run.session.live_counters() + run.session.live_registries() != 0 {
        run.issue(
            FAILURE_CHECK_UNEXPECTED_VALUE,
            "session",
            "instances still live after every delete".to_string(),
        );
    }
}
