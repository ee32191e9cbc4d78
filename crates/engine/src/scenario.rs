//! Scenario runner – execute scripted calculator flows from YAML files.

use crate::commands::CommandRegistry;
use crate::context::AppContext;
use crate::types::*;
use serde_json::Value;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario step by step on `ctx` and return the overall result.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &mut AppContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let (mut r, expect, status_checked) = match step {
            ScenarioStep::Call {
                call,
                args,
                expect_status,
                expect,
            } => {
                let args = if args.is_null() {
                    Value::Object(Default::default())
                } else {
                    args.clone()
                };
                let mut r = registry.execute(call, args, ctx);
                let actual_status = serde_json::to_value(r.status)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
                if actual_status != *expect_status {
                    tracing::warn!(
                        step = i,
                        expected = %expect_status,
                        actual = %actual_status,
                        "scenario step status mismatch"
                    );
                    mark_failed(
                        &mut r,
                        format!("expected status {}, got {}", expect_status, actual_status),
                    );
                }
                (r, expect.as_ref(), true)
            }
            ScenarioStep::Keys { keys, expect } => {
                let r = registry.execute(
                    "keys",
                    serde_json::json!({ "sequence": keys }),
                    ctx,
                );
                (r, expect.as_ref(), false)
            }
        };

        if let Some(expect) = expect {
            if let Some(msg) = check_view(expect, r.data.as_ref()) {
                tracing::warn!(step = i, mismatch = %msg, "scenario step view mismatch");
                mark_failed(&mut r, msg);
            }
        }

        let unexpected_error = !status_checked && r.status == Status::Error;
        if r.status == Status::Fail || unexpected_error {
            overall = Status::Fail;
        }
        step_results.push(r);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}

/// Compare the expected fields against a view payload; `None` when all match.
fn check_view(expect: &ExpectedView, data: Option<&Value>) -> Option<String> {
    let field = |name: &str| data.and_then(|d| d.get(name)).and_then(|v| v.as_str());

    let checks = [("input", &expect.input), ("history", &expect.history)];
    for (name, wanted) in checks {
        if let Some(wanted) = wanted {
            let actual = field(name);
            if actual != Some(wanted.as_str()) {
                return Some(format!(
                    "expected {} {:?}, got {:?}",
                    name,
                    wanted,
                    actual.unwrap_or("<missing>")
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let yaml = r#"
name: basic test
steps:
  - call: "digit"
    args: { digit: "5" }
    expect_status: "pass"
  - keys: "+3="
    expect:
      input: "8"
"#;
        let s = load_scenario(yaml).expect("should parse");
        assert_eq!(s.name, Some("basic test".into()));
        assert_eq!(s.steps.len(), 2);
        assert!(matches!(s.steps[1], ScenarioStep::Keys { .. }));
    }

    #[test]
    fn test_run_bundled_chaining_scenario() {
        let scenario = load_scenario(include_str!("../scenarios/chaining.yaml")).unwrap();
        let mut ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(
            result.overall_status,
            Status::Pass,
            "{:#?}",
            result.step_results
        );
        assert_eq!(result.step_results.len(), scenario.steps.len());
    }

    #[test]
    fn test_run_bundled_errors_scenario() {
        let scenario = load_scenario(include_str!("../scenarios/errors.yaml")).unwrap();
        let mut ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(
            result.overall_status,
            Status::Pass,
            "{:#?}",
            result.step_results
        );
    }

    #[test]
    fn test_view_mismatch_fails() {
        let yaml = r#"
steps:
  - keys: "2*2="
    expect:
      input: "5"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Fail);
        let err = result.step_results[0].error.as_ref().unwrap();
        assert_eq!(err.code, ErrorCode::ExpectationFailed);
    }

    #[test]
    fn test_expected_error_status_passes() {
        let yaml = r#"
steps:
  - call: "evaluate"
    args: { op: "/", lhs: 1, rhs: 0 }
    expect_status: "error"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.step_results[0].status, Status::Error);
        assert_eq!(result.overall_status, Status::Pass);
    }

    #[test]
    fn test_bad_key_sequence_fails_scenario() {
        let yaml = r#"
steps:
  - keys: "2<Tab>"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Fail);
    }
}
