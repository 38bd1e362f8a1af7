//! Reply payloads returned to the host runtime.

use crate::error::AgentError;
use crate::operations::OperationKind;
use serde::Serialize;
use serde_json::Value;

pub const REPLY_ACTION: &str = "REPLY";

/// Structured reply for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub text: String,
    pub thought: String,
    pub actions: Vec<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Result of a successful operation before formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub text: String,
    pub data: Option<Value>,
}

impl Outcome {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl Response {
    pub fn success(kind: OperationKind, outcome: Outcome, source: &str) -> Self {
        Self {
            text: outcome.text,
            thought: format!("{} completed", kind),
            actions: actions(kind),
            source: source.to_string(),
            data: outcome.data,
        }
    }

    /// `verb` completes "Failed to ...", e.g. "transfer SOL from Swig wallet"
    pub fn failure(kind: OperationKind, verb: &str, error: &AgentError, source: &str) -> Self {
        Self {
            text: format!("Failed to {}: {}", verb, error),
            thought: format!("{} failed with {}", kind, error.kind()),
            actions: actions(kind),
            source: source.to_string(),
            data: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.text.starts_with("Failed to ")
    }
}

fn actions(kind: OperationKind) -> Vec<String> {
    vec![kind.to_string(), REPLY_ACTION.to_string()]
}
