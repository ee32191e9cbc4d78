use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Final result JSON – the stable output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub run_id: String,
    pub command: String,
    pub target: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timing_ms: TimingInfo,
    /// Command-specific payload, usually the calculator view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    DivideByZero,
    Overflow,
    NotANumber,
    ExpectationFailed,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        f.write_str(&s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingInfo {
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Scenario types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    Call {
        call: String,
        #[serde(default)]
        args: serde_json::Value,
        #[serde(default = "default_expect_status")]
        expect_status: String,
        #[serde(default)]
        expect: Option<ExpectedView>,
    },
    Keys {
        keys: String,
        #[serde(default)]
        expect: Option<ExpectedView>,
    },
}

/// Fields left out are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedView {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
}

fn default_expect_status() -> String {
    "pass".to_string()
}

// ---------------------------------------------------------------------------
// Scenario result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: Option<String>,
    pub overall_status: Status,
    pub step_results: Vec<CommandResult>,
}

// ---------------------------------------------------------------------------
// Serve / daemon protocol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a new run ID (UUIDv4).
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build a successful CommandResult shell (caller fills in data).
pub fn result_ok(command: &str, target: &str, run_id: &str, total_ms: u64) -> CommandResult {
    CommandResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        target: target.to_string(),
        status: Status::Pass,
        error: None,
        timing_ms: TimingInfo { total: total_ms },
        data: None,
    }
}

/// Build an error CommandResult.
pub fn result_err(
    command: &str,
    target: &str,
    run_id: &str,
    total_ms: u64,
    code: ErrorCode,
    message: impl Into<String>,
) -> CommandResult {
    CommandResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        target: target.to_string(),
        status: Status::Error,
        error: Some(ErrorInfo {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
        }),
        timing_ms: TimingInfo { total: total_ms },
        data: None,
    }
}

/// Mark a result as failed against an expectation, keeping its data.
pub fn mark_failed(result: &mut CommandResult, message: impl Into<String>) {
    result.status = Status::Fail;
    result.error = Some(ErrorInfo {
        code: ErrorCode::ExpectationFailed,
        message: message.into(),
        details: serde_json::Value::Null,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_json_contract() {
        let r = result_ok("digit", "7", "run-1", 3);
        let j = serde_json::to_value(&r).unwrap();
        assert_eq!(j["status"], "pass");
        assert_eq!(j["timing_ms"], serde_json::json!({ "total": 3 }));
        assert!(j.get("error").is_none());

        let mut r = result_err("evaluate", "/", "run-2", 0, ErrorCode::DivideByZero, "nope");
        assert_eq!(serde_json::to_value(&r).unwrap()["error"]["code"], "DIVIDE_BY_ZERO");
        mark_failed(&mut r, "expected pass");
        assert_eq!(r.status, Status::Fail);
        assert_eq!(r.error.unwrap().code, ErrorCode::ExpectationFailed);
    }

    #[test]
    fn test_status_values() {
        for (s, status) in [("pass", Status::Pass), ("fail", Status::Fail), ("error", Status::Error)] {
            assert_eq!(serde_json::from_value::<Status>(s.into()).unwrap(), status);
        }
        assert!(serde_json::from_value::<Status>("skip".into()).is_err());
    }
}
