//! Plan schema definitions.
//!
//! This module contains the struct definitions that map to the plan file
//! format (YAML or JSON). Field names are camelCase on the wire, with
//! snake_case accepted as aliases.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Step parameters, keyed by parameter name.
pub type Params = Map<String, Value>;

/// Outputs produced by one step, keyed by output name.
pub type Outputs = Map<String, Value>;

/// Outputs of every completed step, keyed by step ID.
pub type StepOutputs = BTreeMap<String, Outputs>;

/// A declarative, immutable DAG of steps submitted for one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    /// Plan identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Steps, in declaration order
    #[serde(default)]
    pub steps: Vec<PlanStep>,

    /// Plan-level parameters (informational, never injected into steps)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Params,

    /// When the plan was created
    #[serde(default = "Utc::now", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    /// Create an empty plan.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            params: Params::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a step.
    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Set a plan-level parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Find a step by ID (first match).
    pub fn step(&self, id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Check whether a step with the given ID exists.
    pub fn contains_step(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.id == id)
    }
}

/// One unit of provisioning work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// Step ID, unique within its plan
    pub id: String,

    /// Registered step type
    #[serde(rename = "type")]
    pub step_type: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Parameters; a value may be a `$step.<id>.<output>` reference
    #[serde(default)]
    pub params: Params,

    /// Explicit dependencies
    #[serde(default, alias = "depends_on", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Run only when this condition holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<StepCondition>,

    /// Roll back completed steps if this step fails
    #[serde(default, alias = "rollback_on_failure", skip_serializing_if = "is_false")]
    pub rollback_on_failure: bool,

    /// Invocation timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PlanStep {
    /// Create a step with no parameters. The name defaults to the ID.
    pub fn new(id: impl Into<String>, step_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            step_type: step_type.into(),
            ..Default::default()
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add an explicit dependency.
    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.depends_on.push(step_id.into());
        self
    }

    /// Gate the step on another step's result.
    pub fn with_condition(mut self, step_id: impl Into<String>, check: ConditionCheck) -> Self {
        self.condition = Some(StepCondition {
            step_id: step_id.into(),
            check,
        });
        self
    }

    /// Roll back completed steps if this one fails.
    pub fn rollback_on_failure(mut self) -> Self {
        self.rollback_on_failure = true;
        self
    }

    /// Bound the handler invocation.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }
}

/// Condition evaluated against another step's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepCondition {
    /// Step whose result is inspected
    #[serde(alias = "step_id")]
    pub step_id: String,

    /// Expected outcome
    pub check: ConditionCheck,
}

/// Outcome a condition checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCheck {
    /// Synonym of `completed`
    Succeeded,
    /// Target step completed
    Completed,
    /// Target step failed
    Failed,
    /// Target step was skipped
    Skipped,
    /// Unrecognized check; never satisfied
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_plan() {
        let plan: ExecutionPlan = serde_json::from_value(json!({
            "id": "site",
            "name": "Static site",
            "createdAt": "2026-01-01T00:00:00Z",
            "steps": [
                {"id": "bucket", "type": "storage.bucket", "params": {"name": "assets"}},
                {
                    "id": "dns",
                    "type": "dns.record",
                    "dependsOn": ["bucket"],
                    "rollbackOnFailure": true,
                    "timeout": 500,
                    "condition": {"stepId": "bucket", "check": "succeeded"},
                    "params": {"value": "$step.bucket.bucket_url"}
                }
            ]
        }))
        .unwrap();

        assert_eq!(plan.steps.len(), 2);
        let dns = &plan.steps[1];
        assert_eq!(dns.step_type, "dns.record");
        assert_eq!(dns.depends_on, vec!["bucket"]);
        assert!(dns.rollback_on_failure);
        assert_eq!(dns.timeout, Some(500));
        assert_eq!(
            dns.condition,
            Some(StepCondition {
                step_id: "bucket".into(),
                check: ConditionCheck::Succeeded
            })
        );
    }

    #[test]
    fn accepts_snake_case_aliases() {
        let step: PlanStep = serde_json::from_value(json!({
            "id": "b",
            "type": "t",
            "depends_on": ["a"],
            "rollback_on_failure": true,
            "condition": {"step_id": "a", "check": "failed"}
        }))
        .unwrap();

        assert_eq!(step.depends_on, vec!["a"]);
        assert!(step.rollback_on_failure);
        assert_eq!(step.condition.unwrap().step_id, "a");
    }

    #[test]
    fn unknown_check_deserializes() {
        let condition: StepCondition =
            serde_json::from_value(json!({"stepId": "a", "check": "exploded"})).unwrap();
        assert_eq!(condition.check, ConditionCheck::Unknown);
    }

    #[test]
    fn optional_fields_default() {
        let plan: ExecutionPlan = serde_json::from_value(json!({
            "id": "p",
            "name": "P",
            "steps": [{"id": "a", "type": "t"}]
        }))
        .unwrap();

        let step = &plan.steps[0];
        assert!(plan.description.is_empty());
        assert!(step.params.is_empty());
        assert!(step.depends_on.is_empty());
        assert!(step.condition.is_none());
        assert!(!step.rollback_on_failure);
        assert!(step.timeout.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let step = PlanStep::new("db", "database.instance")
            .with_param("engine", "postgres")
            .depends_on("vpc")
            .with_condition("vpc", ConditionCheck::Completed)
            .rollback_on_failure()
            .with_timeout(30_000);

        assert_eq!(step.name, "db");
        assert_eq!(step.params["engine"], json!("postgres"));
        assert_eq!(step.depends_on, vec!["vpc"]);
        assert!(step.rollback_on_failure);
        assert_eq!(step.timeout, Some(30_000));
    }

    #[test]
    fn serialization_skips_defaults() {
        let step = PlanStep::new("a", "t");
        let value = serde_json::to_value(&step).unwrap();
        assert!(value.get("dependsOn").is_none());
        assert!(value.get("rollbackOnFailure").is_none());
        assert_eq!(value["type"], json!("t"));
    }

    #[test]
    fn plan_lookup_by_id() {
        let plan = ExecutionPlan::new("p", "P")
            .with_step(PlanStep::new("a", "t"))
            .with_step(PlanStep::new("b", "t"));

        assert!(plan.contains_step("b"));
        assert!(!plan.contains_step("c"));
        assert_eq!(plan.step("a").map(|s| s.step_type.as_str()), Some("t"));
    }
}
