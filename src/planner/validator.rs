//! Plan validation rules.
//!
//! This module validates a plan before anything runs:
//! - Step IDs must be unique
//! - Step types must be registered
//! - Required parameters must be set
//! - Dependencies, references and conditions must name steps of the plan
//! - No circular dependencies allowed

use std::collections::HashSet;

use serde_json::Value;

use crate::plan::{ExecutionPlan, PlanStep};
use crate::planner::dependency::{format_cycle, DependencyGraph};
use crate::planner::reference::{extract_refs, is_output_ref};
use crate::registry::StepTypeRegistry;

const REF_PREFIX: &str = "$step.";

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step ID if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn for_step(rule: &str, step: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: Some(step.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validate a plan and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, so a plan can be fixed in a single pass.
pub fn validate_plan(plan: &ExecutionPlan, registry: &StepTypeRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_unique_ids(plan));
    let ids: HashSet<&str> = plan.steps.iter().map(|s| s.id.as_str()).collect();
    for step in &plan.steps {
        errors.extend(validate_step(step, &ids, registry));
    }
    errors.extend(validate_cycles(plan));

    errors
}

/// Validate a plan and return its error messages; empty means valid.
pub fn validate(plan: &ExecutionPlan, registry: &StepTypeRegistry) -> Vec<String> {
    validate_plan(plan, registry)
        .into_iter()
        .map(|e| e.message)
        .collect()
}

fn validate_unique_ids(plan: &ExecutionPlan) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    for step in &plan.steps {
        if !seen.insert(step.id.as_str()) && reported.insert(step.id.as_str()) {
            errors.push(ValidationError::for_step(
                "duplicate-step-id",
                &step.id,
                format!("Duplicate step ID '{}'", step.id),
            ));
        }
    }

    errors
}

fn validate_step(
    step: &PlanStep,
    ids: &HashSet<&str>,
    registry: &StepTypeRegistry,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(definition) = registry.get(&step.step_type) else {
        errors.push(ValidationError::for_step(
            "unknown-step-type",
            &step.id,
            format!(
                "Step '{}' has unknown type '{}'",
                step.id, step.step_type
            ),
        ));
        return errors;
    };

    for param in &definition.required_params {
        let satisfied = match step.params.get(param) {
            Some(value) => is_output_ref(value) || !is_empty_value(value),
            None => false,
        };
        if !satisfied {
            errors.push(ValidationError::for_step(
                "missing-required-param",
                &step.id,
                format!(
                    "Step '{}' is missing required parameter '{}'",
                    step.id, param
                ),
            ));
        }
    }

    for dep in &step.depends_on {
        if dep == &step.id {
            errors.push(ValidationError::for_step(
                "self-dependency",
                &step.id,
                format!("Step '{}' depends on itself", step.id),
            ));
        } else if !ids.contains(dep.as_str()) {
            errors.push(ValidationError::for_step(
                "undefined-dependency",
                &step.id,
                format!("Step '{}' depends on '{}' which does not exist", step.id, dep),
            ));
        }
    }

    let mut malformed = Vec::new();
    for value in step.params.values() {
        collect_malformed_refs(value, &mut malformed);
    }
    for text in malformed {
        errors.push(ValidationError::for_step(
            "malformed-reference",
            &step.id,
            format!("Step '{}' has malformed output reference '{}'", step.id, text),
        ));
    }

    for r in extract_refs(&step.params) {
        if !ids.contains(r.step_id.as_str()) {
            errors.push(ValidationError::for_step(
                "undefined-reference",
                &step.id,
                format!(
                    "Step '{}' references output of '{}' which does not exist",
                    step.id, r.step_id
                ),
            ));
        }
    }

    if let Some(condition) = &step.condition {
        if !ids.contains(condition.step_id.as_str()) {
            errors.push(ValidationError::for_step(
                "undefined-condition-step",
                &step.id,
                format!(
                    "Step '{}' has a condition on '{}' which does not exist",
                    step.id, condition.step_id
                ),
            ));
        }
    }

    errors
}

fn validate_cycles(plan: &ExecutionPlan) -> Vec<ValidationError> {
    match DependencyGraph::from_plan(plan).find_cycle() {
        Some(path) => vec![ValidationError {
            rule: "circular-dependency".to_string(),
            message: format!("Circular dependency detected: {}", format_cycle(&path)),
            step: path.first().cloned(),
        }],
        None => Vec::new(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Strings that look like references but do not parse.
fn collect_malformed_refs(value: &Value, malformed: &mut Vec<String>) {
    match value {
        Value::String(s) if s.starts_with(REF_PREFIX) && !is_output_ref(value) => {
            malformed.push(s.clone());
        }
        Value::Array(items) => items.iter().for_each(|v| collect_malformed_refs(v, malformed)),
        Value::Object(map) => map.values().for_each(|v| collect_malformed_refs(v, malformed)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::plan::{ConditionCheck, Outputs};
    use crate::registry::{StepContext, StepDefinition, StepHandler};
    use async_trait::async_trait;
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl StepHandler for Noop {
        async fn execute(&self, _ctx: &StepContext) -> Result<Outputs> {
            Ok(Outputs::new())
        }
    }

    fn registry() -> StepTypeRegistry {
        let registry = StepTypeRegistry::new();
        registry
            .register(
                StepDefinition::new("network.vpc", "network")
                    .with_required(&["name", "cidr"])
                    .with_outputs(&["vpc_id"]),
                Noop,
            )
            .unwrap();
        registry
            .register(
                StepDefinition::new("network.subnet", "network")
                    .with_required(&["vpc_id", "cidr"])
                    .with_outputs(&["subnet_id"]),
                Noop,
            )
            .unwrap();
        registry
    }

    fn vpc(id: &str) -> PlanStep {
        PlanStep::new(id, "network.vpc")
            .with_param("name", "main")
            .with_param("cidr", "10.0.0.0/16")
    }

    fn rules(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.rule.as_str()).collect()
    }

    #[test]
    fn valid_plan_has_no_errors() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("vpc"))
            .with_step(
                PlanStep::new("subnet", "network.subnet")
                    .with_param("vpc_id", "$step.vpc.vpc_id")
                    .with_param("cidr", "10.0.1.0/24"),
            );

        assert!(validate(&plan, &registry()).is_empty());
    }

    #[test]
    fn detects_duplicate_ids_once() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("vpc"))
            .with_step(vpc("vpc"))
            .with_step(vpc("vpc"));

        let errors = validate_plan(&plan, &registry());
        assert_eq!(rules(&errors), vec!["duplicate-step-id"]);
    }

    #[test]
    fn unknown_type_skips_remaining_checks() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(PlanStep::new("x", "nope").depends_on("missing"));

        let errors = validate_plan(&plan, &registry());
        assert_eq!(rules(&errors), vec!["unknown-step-type"]);
        assert_eq!(errors[0].message, "Step 'x' has unknown type 'nope'");
    }

    #[test]
    fn required_params_must_be_non_empty() {
        let plan = ExecutionPlan::new("p", "Plan").with_step(
            PlanStep::new("vpc", "network.vpc")
                .with_param("name", "")
                .with_param("cidr", Value::Null),
        );

        let errors = validate_plan(&plan, &registry());
        assert_eq!(
            rules(&errors),
            vec!["missing-required-param", "missing-required-param"]
        );
    }

    #[test]
    fn reference_satisfies_required_param() {
        let plan = ExecutionPlan::new("p", "Plan").with_step(vpc("vpc")).with_step(
            PlanStep::new("subnet", "network.subnet")
                .with_param("vpc_id", "$step.vpc.vpc_id")
                .with_param("cidr", "$step.vpc.cidr"),
        );

        assert!(validate(&plan, &registry()).is_empty());
    }

    #[test]
    fn flags_self_and_undefined_dependencies() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("a").depends_on("a"))
            .with_step(vpc("b").depends_on("ghost"));

        let errors = validate_plan(&plan, &registry());
        let found = rules(&errors);
        assert!(found.contains(&"self-dependency"));
        assert!(found.contains(&"undefined-dependency"));
    }

    #[test]
    fn flags_malformed_and_undefined_references() {
        let plan = ExecutionPlan::new("p", "Plan").with_step(
            vpc("a")
                .with_param("region", "$step.only-two")
                .with_param("tags", json!(["$step.ghost.id"])),
        );

        let errors = validate_plan(&plan, &registry());
        let found = rules(&errors);
        assert!(found.contains(&"malformed-reference"));
        assert!(found.contains(&"undefined-reference"));
    }

    #[test]
    fn embedded_reference_is_a_literal() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("a").with_param("description", "prefix-$step.ghost.id"));

        assert!(validate(&plan, &registry()).is_empty());
    }

    #[test]
    fn flags_undefined_condition_step() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("a").with_condition("ghost", ConditionCheck::Completed));

        let errors = validate_plan(&plan, &registry());
        assert_eq!(rules(&errors), vec!["undefined-condition-step"]);
    }

    #[test]
    fn reports_one_cycle_with_path() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("a").depends_on("b"))
            .with_step(vpc("b").depends_on("c"))
            .with_step(vpc("c").depends_on("a"));

        let errors = validate(&plan, &registry());
        assert_eq!(errors, vec!["Circular dependency detected: a → b → c → a"]);
    }

    #[test]
    fn cycle_through_references_is_detected() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("a").with_param("region", "$step.b.vpc_id"))
            .with_step(vpc("b").with_param("region", "$step.a.vpc_id"));

        let errors = validate_plan(&plan, &registry());
        assert!(rules(&errors).contains(&"circular-dependency"));
    }

    #[test]
    fn collects_every_independent_defect() {
        let plan = ExecutionPlan::new("p", "Plan")
            .with_step(vpc("dup"))
            .with_step(vpc("dup"))
            .with_step(PlanStep::new("unknown", "nope"))
            .with_step(vpc("dangling").depends_on("ghost"))
            .with_step(vpc("badref").with_param("region", "$step.nowhere.id"))
            .with_step(vpc("selfish").depends_on("selfish"));

        let errors = validate(&plan, &registry());
        assert!(errors.len() >= 5, "got {:?}", errors);
    }
}
