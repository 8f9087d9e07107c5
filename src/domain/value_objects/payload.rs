use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of a record's local-shape JSON at enqueue time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationPayload(Value);

impl OperationPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    fn validate(value: &Value) -> Result<(), String> {
        if !value.is_object() {
            return Err("Operation payload must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl From<OperationPayload> for Value {
    fn from(payload: OperationPayload) -> Self {
        payload.0
    }
}
