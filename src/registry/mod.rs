//! Step type registry and built-in step catalog.
//!
//! - [`StepTypeRegistry`] - type name to definition and handler
//! - [`StepDefinition`] - parameter and output schema of a type
//! - [`StepHandler`] - executable capability, with optional rollback
//! - [`register_builtins`] - bootstrap of the built-in provisioning types
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use planwright::registry::{
//!     register_builtins, ManagerFactories, MemoryResourceManager, ResourceManager,
//!     StepTypeRegistry,
//! };
//!
//! let registry = StepTypeRegistry::new();
//! let manager: Arc<dyn ResourceManager> = Arc::new(MemoryResourceManager::new());
//! register_builtins(&registry, &ManagerFactories::shared(manager)).unwrap();
//!
//! assert!(registry.has("storage.bucket"));
//! ```

pub mod builtin;
pub mod definition;
pub mod handler;
pub mod manager;
pub mod store;

pub use builtin::{builtin_catalog, placeholder_outputs, register_builtins, BuiltinStep};
pub use definition::StepDefinition;
pub use handler::{StepContext, StepHandler, StepLogger};
pub use manager::{
    ManagerFactories, ManagerFactory, MemoryResource, MemoryResourceManager, ResourceDomain,
    ResourceManager,
};
pub use store::StepTypeRegistry;
