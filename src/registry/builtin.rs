//! Built-in provisioning step types.
//!
//! [`register_builtins`] wires each catalog entry to a handler that closes
//! over the [`ManagerFactory`] of its domain. Types already present in the
//! registry are left untouched, so repeated bootstrap is safe.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::plan::Outputs;

use super::definition::StepDefinition;
use super::handler::{StepContext, StepHandler};
use super::manager::{ManagerFactories, ManagerFactory, ResourceDomain};
use super::store::StepTypeRegistry;

/// A catalog entry: definition, owning domain and whether it can be undone.
#[derive(Debug, Clone)]
pub struct BuiltinStep {
    pub definition: StepDefinition,
    pub domain: ResourceDomain,
    pub reversible: bool,
}

/// The fixed built-in catalog.
pub fn builtin_catalog() -> Vec<BuiltinStep> {
    vec![
        BuiltinStep {
            definition: StepDefinition::new("storage.bucket", "storage")
                .with_description("Create an object storage bucket")
                .with_required(&["name"])
                .with_optional(&["region", "versioning", "public"])
                .with_outputs(&["bucket_name", "bucket_url"]),
            domain: ResourceDomain::Storage,
            reversible: true,
        },
        BuiltinStep {
            definition: StepDefinition::new("database.instance", "database")
                .with_description("Create a managed database instance")
                .with_required(&["name", "engine"])
                .with_optional(&["size", "storage_gb", "version"])
                .with_outputs(&["instance_id", "endpoint", "port"]),
            domain: ResourceDomain::Database,
            reversible: true,
        },
        BuiltinStep {
            definition: StepDefinition::new("network.vpc", "network")
                .with_description("Create a virtual private network")
                .with_required(&["name", "cidr"])
                .with_optional(&["region"])
                .with_outputs(&["vpc_id"]),
            domain: ResourceDomain::Network,
            reversible: true,
        },
        BuiltinStep {
            definition: StepDefinition::new("network.subnet", "network")
                .with_description("Create a subnet inside a network")
                .with_required(&["vpc_id", "cidr"])
                .with_optional(&["zone"])
                .with_outputs(&["subnet_id"]),
            domain: ResourceDomain::Network,
            reversible: true,
        },
        BuiltinStep {
            definition: StepDefinition::new("compute.instance", "compute")
                .with_description("Launch a compute instance")
                .with_required(&["name", "image"])
                .with_optional(&["size", "subnet_id"])
                .with_outputs(&["instance_id", "private_ip"]),
            domain: ResourceDomain::Compute,
            reversible: true,
        },
        BuiltinStep {
            definition: StepDefinition::new("dns.record", "dns")
                .with_description("Publish a DNS record")
                .with_required(&["zone", "name", "value"])
                .with_optional(&["ttl", "record_type"])
                .with_outputs(&["fqdn"]),
            domain: ResourceDomain::Dns,
            reversible: false,
        },
    ]
}

/// Register every built-in type whose domain has a factory.
///
/// Returns how many types were newly registered.
pub fn register_builtins(registry: &StepTypeRegistry, factories: &ManagerFactories) -> Result<usize> {
    let mut registered = 0;

    for builtin in builtin_catalog() {
        let step_type = builtin.definition.step_type.clone();
        if registry.has(&step_type) {
            continue;
        }

        let Some(factory) = factories.get(builtin.domain) else {
            tracing::debug!(
                step_type = %step_type,
                domain = %builtin.domain,
                "No manager factory for domain, skipping built-in"
            );
            continue;
        };

        let handler = ResourceStepHandler {
            kind: step_type,
            outputs: builtin.definition.outputs.clone(),
            reversible: builtin.reversible,
            factory,
        };
        registry.register(builtin.definition, handler)?;
        registered += 1;
    }

    Ok(registered)
}

/// Deterministic outputs returned by built-in handlers in dry-run mode.
pub fn placeholder_outputs(step_id: &str, names: &[String]) -> Outputs {
    names
        .iter()
        .map(|name| {
            (
                name.clone(),
                Value::String(format!("dry-run-{}-{}", step_id, name)),
            )
        })
        .collect()
}

/// Handler for a built-in type, delegating to its domain's manager.
struct ResourceStepHandler {
    kind: String,
    outputs: Vec<String>,
    reversible: bool,
    factory: ManagerFactory,
}

#[async_trait]
impl StepHandler for ResourceStepHandler {
    async fn execute(&self, ctx: &StepContext) -> Result<Outputs> {
        if ctx.dry_run {
            ctx.logger.info(&format!("Would create {}", self.kind));
            return Ok(placeholder_outputs(&ctx.step_id, &self.outputs));
        }

        let manager = (self.factory)();
        let outputs = manager.create(&self.kind, &ctx.params).await?;
        ctx.logger.info(&format!("Created {}", self.kind));
        Ok(outputs)
    }

    fn supports_rollback(&self) -> bool {
        self.reversible
    }

    async fn rollback(&self, ctx: &StepContext, outputs: &Outputs) -> Result<()> {
        let manager = (self.factory)();
        manager.delete(&self.kind, outputs).await?;
        ctx.logger.info(&format!("Deleted {}", self.kind));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::manager::{MemoryResourceManager, ResourceManager};
    use serde_json::json;
    use std::sync::Arc;

    fn memory_factories() -> (Arc<MemoryResourceManager>, ManagerFactories) {
        let manager = Arc::new(MemoryResourceManager::new());
        let shared: Arc<dyn ResourceManager> = manager.clone();
        (manager, ManagerFactories::shared(shared))
    }

    #[test]
    fn catalog_types_are_unique() {
        let catalog = builtin_catalog();
        let mut names: Vec<_> = catalog.iter().map(|b| &b.definition.step_type).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn register_builtins_is_idempotent() {
        let registry = StepTypeRegistry::new();
        let (_, factories) = memory_factories();

        let first = register_builtins(&registry, &factories).unwrap();
        let second = register_builtins(&registry, &factories).unwrap();

        assert_eq!(first, builtin_catalog().len());
        assert_eq!(second, 0);
        assert_eq!(registry.len(), builtin_catalog().len());
    }

    #[test]
    fn register_builtins_skips_existing_types() {
        let registry = StepTypeRegistry::new();
        let (_, factories) = memory_factories();
        let custom = StepDefinition::new("storage.bucket", "custom");
        let handler = ResourceStepHandler {
            kind: "storage.bucket".into(),
            outputs: vec![],
            reversible: false,
            factory: factories.get(ResourceDomain::Storage).unwrap(),
        };
        registry.register(custom, handler).unwrap();

        let added = register_builtins(&registry, &factories).unwrap();

        assert_eq!(added, builtin_catalog().len() - 1);
        assert_eq!(registry.get("storage.bucket").unwrap().category, "custom");
    }

    #[test]
    fn register_builtins_requires_factory() {
        let registry = StepTypeRegistry::new();
        let manager: Arc<dyn ResourceManager> = Arc::new(MemoryResourceManager::new());
        let factories =
            ManagerFactories::new().with(ResourceDomain::Dns, move || Arc::clone(&manager));

        let added = register_builtins(&registry, &factories).unwrap();

        assert_eq!(added, 1);
        assert!(registry.has("dns.record"));
        assert!(!registry.has("network.vpc"));
    }

    #[test]
    fn placeholders_are_deterministic() {
        let outputs = placeholder_outputs("vpc", &["vpc_id".to_string()]);
        assert_eq!(outputs["vpc_id"], json!("dry-run-vpc-vpc_id"));
    }

    #[tokio::test]
    async fn dry_run_does_not_touch_manager() {
        let registry = StepTypeRegistry::new();
        let (manager, factories) = memory_factories();
        register_builtins(&registry, &factories).unwrap();

        let handler = registry.get_handler("network.vpc").unwrap();
        let mut ctx = StepContext::new("vpc", Default::default());
        ctx.dry_run = true;

        let outputs = handler.execute(&ctx).await.unwrap();
        assert_eq!(outputs["vpc_id"], json!("dry-run-vpc-vpc_id"));
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn execute_and_rollback_go_through_manager() {
        let registry = StepTypeRegistry::new();
        let (manager, factories) = memory_factories();
        register_builtins(&registry, &factories).unwrap();

        let handler = registry.get_handler("storage.bucket").unwrap();
        let params = json!({"name": "assets"}).as_object().cloned().unwrap();
        let ctx = StepContext::new("bucket", params);

        let outputs = handler.execute(&ctx).await.unwrap();
        assert_eq!(manager.len(), 1);
        assert!(handler.supports_rollback());

        handler.rollback(&ctx, &outputs).await.unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn dns_records_are_irreversible() {
        let registry = StepTypeRegistry::new();
        let (_, factories) = memory_factories();
        register_builtins(&registry, &factories).unwrap();

        assert!(!registry.get_handler("dns.record").unwrap().supports_rollback());
    }
}
