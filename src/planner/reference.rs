//! Output references between steps.
//!
//! A parameter value that is exactly `$step.<id>.<output>` defers to the
//! named output of another step. There is no escaping, nesting or partial
//! interpolation: `"prefix-$step.a.b"` is a plain literal.
//!
//! # Example
//!
//! ```
//! use planwright::planner::reference::{is_output_ref, resolve};
//! use planwright::plan::{Params, StepOutputs};
//! use serde_json::json;
//!
//! assert!(is_output_ref(&json!("$step.vpc.vpc_id")));
//!
//! let mut params = Params::new();
//! params.insert("vpc_id".into(), json!("$step.vpc.vpc_id"));
//!
//! let mut outputs = StepOutputs::new();
//! let mut vpc = serde_json::Map::new();
//! vpc.insert("vpc_id".into(), json!("vpc-123"));
//! outputs.insert("vpc".into(), vpc);
//!
//! let resolved = resolve(&params, &outputs).unwrap();
//! assert_eq!(resolved["vpc_id"], json!("vpc-123"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{PlanwrightError, Result};
use crate::plan::{Params, StepOutputs};

/// Anchored `$step.<id>.<output>` pattern.
static OUTPUT_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$step\.([A-Za-z0-9_-]+)\.([A-Za-z0-9_]+)$")
        .expect("OUTPUT_REF_REGEX must compile")
});

/// A parsed output reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    /// Step that produces the output.
    pub step_id: String,
    /// Output name on that step.
    pub output: String,
}

impl std::fmt::Display for OutputRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$step.{}.{}", self.step_id, self.output)
    }
}

/// Parse a string as an output reference.
pub fn parse_ref_str(input: &str) -> Option<OutputRef> {
    let captures = OUTPUT_REF_REGEX.captures(input)?;
    Some(OutputRef {
        step_id: captures[1].to_string(),
        output: captures[2].to_string(),
    })
}

/// Parse a parameter value as an output reference.
pub fn parse_output_ref(value: &Value) -> Option<OutputRef> {
    value.as_str().and_then(parse_ref_str)
}

/// Check whether a parameter value is an output reference.
pub fn is_output_ref(value: &Value) -> bool {
    value.as_str().is_some_and(|s| OUTPUT_REF_REGEX.is_match(s))
}

/// Collect every output reference in `params`, including those nested in
/// arrays and objects.
pub fn extract_refs(params: &Params) -> Vec<OutputRef> {
    let mut refs = Vec::new();
    for value in params.values() {
        collect_refs(value, &mut refs);
    }
    refs
}

fn collect_refs(value: &Value, refs: &mut Vec<OutputRef>) {
    match value {
        Value::String(_) => refs.extend(parse_output_ref(value)),
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, refs)),
        Value::Object(map) => map.values().for_each(|v| collect_refs(v, refs)),
        _ => {}
    }
}

/// Step IDs referenced from `params`, deduplicated, in scan order.
pub fn referenced_steps(params: &Params) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    for r in extract_refs(params) {
        if !steps.contains(&r.step_id) {
            steps.push(r.step_id);
        }
    }
    steps
}

/// Substitute every output reference in `params`.
///
/// # Errors
///
/// Returns `NoOutputsYet` if a source step has no entry in `outputs`, and
/// `OutputNotFound` if the entry lacks the named output.
pub fn resolve(params: &Params, outputs: &StepOutputs) -> Result<Params> {
    params
        .iter()
        .map(|(name, value)| -> Result<(String, Value)> {
            Ok((name.clone(), resolve_value(value, outputs)?))
        })
        .collect()
}

fn resolve_value(value: &Value, outputs: &StepOutputs) -> Result<Value> {
    match value {
        Value::String(_) => match parse_output_ref(value) {
            Some(r) => lookup(&r, outputs),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|v| resolve_value(v, outputs))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => resolve(map, outputs).map(Value::Object),
        _ => Ok(value.clone()),
    }
}

fn lookup(r: &OutputRef, outputs: &StepOutputs) -> Result<Value> {
    let step_outputs = outputs
        .get(&r.step_id)
        .ok_or_else(|| PlanwrightError::NoOutputsYet {
            step: r.step_id.clone(),
        })?;

    step_outputs
        .get(&r.output)
        .cloned()
        .ok_or_else(|| PlanwrightError::OutputNotFound {
            step: r.step_id.clone(),
            output: r.output.clone(),
        })
}
