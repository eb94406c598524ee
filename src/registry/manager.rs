//! Resource managers behind the built-in step types.
//!
//! Built-in handlers never talk to a provider directly. They obtain a
//! [`ResourceManager`] from the factory registered for their
//! [`ResourceDomain`], so provider SDK wrappers stay swappable.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{PlanwrightError, Result};
use crate::plan::{Outputs, Params};

/// Resource domain a built-in step type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceDomain {
    Storage,
    Database,
    Network,
    Compute,
    Dns,
}

impl ResourceDomain {
    /// Every domain, in catalog order.
    pub const ALL: [ResourceDomain; 5] = [
        ResourceDomain::Storage,
        ResourceDomain::Database,
        ResourceDomain::Network,
        ResourceDomain::Compute,
        ResourceDomain::Dns,
    ];
}

impl fmt::Display for ResourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceDomain::Storage => "storage",
            ResourceDomain::Database => "database",
            ResourceDomain::Network => "network",
            ResourceDomain::Compute => "compute",
            ResourceDomain::Dns => "dns",
        };
        write!(f, "{}", s)
    }
}

/// Creates and deletes resources of one or more kinds.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Create a resource of `kind` and return its outputs.
    async fn create(&self, kind: &str, params: &Params) -> Result<Outputs>;

    /// Delete the resource identified by the outputs `create` returned.
    async fn delete(&self, kind: &str, outputs: &Outputs) -> Result<()>;
}

/// Produces the manager for one resource domain.
pub type ManagerFactory = Arc<dyn Fn() -> Arc<dyn ResourceManager> + Send + Sync>;

/// One factory per resource domain.
#[derive(Clone, Default)]
pub struct ManagerFactories {
    factories: HashMap<ResourceDomain, ManagerFactory>,
}

impl ManagerFactories {
    /// Create an empty set of factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same manager for every domain.
    pub fn shared(manager: Arc<dyn ResourceManager>) -> Self {
        ResourceDomain::ALL
            .iter()
            .fold(Self::new(), |factories, domain| {
                let manager = Arc::clone(&manager);
                factories.with(*domain, move || Arc::clone(&manager))
            })
    }

    /// Set the factory for a domain.
    pub fn with(
        mut self,
        domain: ResourceDomain,
        factory: impl Fn() -> Arc<dyn ResourceManager> + Send + Sync + 'static,
    ) -> Self {
        self.factories.insert(domain, Arc::new(factory));
        self
    }

    /// Get the factory for a domain.
    pub fn get(&self, domain: ResourceDomain) -> Option<ManagerFactory> {
        self.factories.get(&domain).cloned()
    }
}

impl fmt::Debug for ManagerFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut domains: Vec<_> = self.factories.keys().collect();
        domains.sort();
        f.debug_struct("ManagerFactories")
            .field("domains", &domains)
            .finish()
    }
}

/// A resource held by [`MemoryResourceManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryResource {
    pub kind: String,
    pub outputs: Outputs,
}

/// In-memory resource manager.
///
/// Generates identifiers locally and keeps created resources until they are
/// deleted. Kinds listed through [`fail_on`](MemoryResourceManager::fail_on)
/// reject creation.
#[derive(Debug, Default)]
pub struct MemoryResourceManager {
    resources: Mutex<BTreeMap<u64, MemoryResource>>,
    next_id: AtomicU64,
    failing: Mutex<HashMap<String, String>>,
}

impl MemoryResourceManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create` of `kind` fail with `message`.
    pub fn fail_on(&self, kind: impl Into<String>, message: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind.into(), message.into());
    }

    /// Resources currently held, in creation order.
    pub fn resources(&self) -> Vec<MemoryResource> {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Number of resources currently held.
    pub fn len(&self) -> usize {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no resources are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn outputs_for(kind: &str, id: u64, params: &Params) -> Outputs {
        let text = |name: &str, fallback: &str| -> String {
            params
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        let value = match kind {
            "storage.bucket" => {
                let name = text("name", "bucket");
                json!({
                    "bucket_name": name,
                    "bucket_url": format!("https://{}.storage.local", name),
                })
            }
            "database.instance" => {
                let name = text("name", "db");
                let port = match text("engine", "postgres").as_str() {
                    "mysql" | "mariadb" => 3306,
                    _ => 5432,
                };
                json!({
                    "instance_id": format!("db-{:04}", id),
                    "endpoint": format!("{}.db.local", name),
                    "port": port,
                })
            }
            "network.vpc" => json!({ "vpc_id": format!("vpc-{:04}", id) }),
            "network.subnet" => json!({ "subnet_id": format!("subnet-{:04}", id) }),
            "compute.instance" => json!({
                "instance_id": format!("i-{:04}", id),
                "private_ip": format!("10.0.{}.{}", id / 250, id % 250 + 4),
            }),
            "dns.record" => json!({
                "fqdn": format!("{}.{}", text("name", "www"), text("zone", "local")),
            }),
            _ => json!({ "id": format!("res-{:04}", id) }),
        };

        value.as_object().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ResourceManager for MemoryResourceManager {
    async fn create(&self, kind: &str, params: &Params) -> Result<Outputs> {
        if let Some(message) = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
        {
            return Err(anyhow::anyhow!("{}", message).into());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let outputs = Self::outputs_for(kind, id, params);
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                MemoryResource {
                    kind: kind.to_string(),
                    outputs: outputs.clone(),
                },
            );
        Ok(outputs)
    }

    async fn delete(&self, kind: &str, outputs: &Outputs) -> Result<()> {
        let mut resources = self.resources.lock().unwrap_or_else(PoisonError::into_inner);
        let key = resources
            .iter()
            .find(|(_, r)| r.kind == kind && &r.outputs == outputs)
            .map(|(k, _)| *k);

        match key {
            Some(k) => {
                resources.remove(&k);
                Ok(())
            }
            None => Err(PlanwrightError::Other(anyhow::anyhow!(
                "no {} resource matches the given outputs",
                kind
            ))),
        }
    }
}
