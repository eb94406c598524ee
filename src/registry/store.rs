//! Step type registry.
//!
//! The [`StepTypeRegistry`] maps a step type name to its definition and its
//! handler. It is an explicit object: construct one, register into it at
//! startup and share it as `Arc<StepTypeRegistry>` with every orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{PlanwrightError, Result};

use super::definition::StepDefinition;
use super::handler::StepHandler;

struct RegisteredStep {
    definition: StepDefinition,
    handler: Arc<dyn StepHandler>,
}

/// Registry of step types.
///
/// Reads and writes go through an internal lock, so a shared registry is
/// safe to consult from concurrent plan runs.
#[derive(Default)]
pub struct StepTypeRegistry {
    entries: RwLock<HashMap<String, RegisteredStep>>,
}

impl StepTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStepType` if the type name is already registered.
    pub fn register(
        &self,
        definition: StepDefinition,
        handler: impl StepHandler + 'static,
    ) -> Result<()> {
        self.register_shared(definition, Arc::new(handler))
    }

    /// Register a step type with an already shared handler.
    pub fn register_shared(
        &self,
        definition: StepDefinition,
        handler: Arc<dyn StepHandler>,
    ) -> Result<()> {
        let mut entries = self.write();
        if entries.contains_key(&definition.step_type) {
            return Err(PlanwrightError::DuplicateStepType {
                step_type: definition.step_type,
            });
        }

        tracing::debug!(step_type = %definition.step_type, "Registered step type");
        entries.insert(
            definition.step_type.clone(),
            RegisteredStep {
                definition,
                handler,
            },
        );
        Ok(())
    }

    /// Get a step type's definition.
    pub fn get(&self, step_type: &str) -> Option<StepDefinition> {
        self.read().get(step_type).map(|e| e.definition.clone())
    }

    /// Get a step type's handler.
    pub fn get_handler(&self, step_type: &str) -> Option<Arc<dyn StepHandler>> {
        self.read().get(step_type).map(|e| Arc::clone(&e.handler))
    }

    /// All definitions, sorted by type name.
    pub fn list(&self) -> Vec<StepDefinition> {
        let mut definitions: Vec<StepDefinition> =
            self.read().values().map(|e| e.definition.clone()).collect();
        definitions.sort_by(|a, b| a.step_type.cmp(&b.step_type));
        definitions
    }

    /// Check if a step type is registered.
    pub fn has(&self, step_type: &str) -> bool {
        self.read().contains_key(step_type)
    }

    /// Remove every registration.
    ///
    /// Intended for tests and for re-bootstrapping a registry; plans already
    /// running keep the handlers they looked up.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Get the number of registered step types.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegisteredStep>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegisteredStep>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for StepTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<String> = self.read().keys().cloned().collect();
        types.sort();
        f.debug_struct("StepTypeRegistry")
            .field("types", &types)
            .finish()
    }
}
