//! Blueprint contract.
//!
//! A blueprint is a named, parameterized template that produces an
//! [`ExecutionPlan`]. Blueprints only generate plans; they never run them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlanwrightError, Result};
use crate::plan::{ExecutionPlan, Params};

/// A declared blueprint parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintParam {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl BlueprintParam {
    /// A required parameter.
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            default: Some(default.into()),
        }
    }
}

/// A template producing execution plans.
pub trait Blueprint: Send + Sync {
    /// Unique blueprint name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Parameters this blueprint accepts.
    fn parameters(&self) -> Vec<BlueprintParam>;

    /// Generate a plan from parameter values.
    ///
    /// Values are expected to have gone through [`resolve_blueprint_params`].
    fn generate(&self, values: &Params) -> Result<ExecutionPlan>;
}

/// Fill in defaults and check the values passed to a blueprint.
///
/// # Errors
///
/// Returns `BlueprintParamError` for a missing required parameter or a value
/// the blueprint does not declare.
pub fn resolve_blueprint_params(blueprint: &dyn Blueprint, values: &Params) -> Result<Params> {
    let declared = blueprint.parameters();

    if let Some(unknown) = values
        .keys()
        .find(|name| !declared.iter().any(|p| &p.name == *name))
    {
        return Err(PlanwrightError::BlueprintParamError {
            param: unknown.clone(),
            message: format!("not declared by blueprint '{}'", blueprint.name()),
        });
    }

    let mut resolved = Params::new();
    for param in declared {
        match values.get(&param.name).or(param.default.as_ref()) {
            Some(value) => {
                resolved.insert(param.name, value.clone());
            }
            None if param.required => {
                return Err(PlanwrightError::BlueprintParamError {
                    param: param.name,
                    message: "required parameter is missing".to_string(),
                });
            }
            None => {}
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanStep;
    use serde_json::json;

    struct StaticSite;

    impl Blueprint for StaticSite {
        fn name(&self) -> &str {
            "static-site"
        }

        fn description(&self) -> &str {
            "Bucket with a DNS record"
        }

        fn parameters(&self) -> Vec<BlueprintParam> {
            vec![
                BlueprintParam::required("site", "Site name"),
                BlueprintParam::optional("zone", "DNS zone", "example.com"),
            ]
        }

        fn generate(&self, values: &Params) -> Result<ExecutionPlan> {
            let site = values["site"].clone();
            Ok(ExecutionPlan::new("static-site", "Static site")
                .with_step(PlanStep::new("bucket", "storage.bucket").with_param("name", site.clone()))
                .with_step(
                    PlanStep::new("dns", "dns.record")
                        .with_param("zone", values["zone"].clone())
                        .with_param("name", site)
                        .with_param("value", "$step.bucket.bucket_url"),
                ))
        }
    }

    fn values(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn defaults_fill_missing_optionals() {
        let resolved = resolve_blueprint_params(&StaticSite, &values(json!({"site": "docs"}))).unwrap();
        assert_eq!(resolved["zone"], json!("example.com"));

        let plan = StaticSite.generate(&resolved).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.step("dns").unwrap().params["zone"], json!("example.com"));
    }

    #[test]
    fn missing_required_param_fails() {
        let err = resolve_blueprint_params(&StaticSite, &Params::new()).unwrap_err();
        assert!(matches!(err, PlanwrightError::BlueprintParamError { ref param, .. } if param == "site"));
    }

    #[test]
    fn undeclared_param_fails() {
        let err =
            resolve_blueprint_params(&StaticSite, &values(json!({"site": "a", "color": "red"})))
                .unwrap_err();
        assert!(err.to_string().contains("color"));
    }
}
