//! Plan execution.
//!
//! [`Orchestrator::execute`] validates a plan, orders its steps and walks
//! them one at a time. A failure short-circuits the rest of the walk; a
//! failing step flagged `rollbackOnFailure` first undoes every step that
//! completed before it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::error::{PlanwrightError, Result};
use crate::plan::{ExecutionPlan, Outputs, PlanStep, StepOutputs};
use crate::planner::{resolve, validate, DependencyGraph};
use crate::registry::{StepContext, StepHandler, StepTypeRegistry};

use super::condition::evaluate_condition;
use super::result::{OrchestrationResult, OrchestrationStatus, StepResult, StepStatus};
use super::rollback::roll_back;

/// Called with the step ID right before its handler runs.
pub type StepStartCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Called with the step ID and its result once the result is recorded.
pub type StepCompleteCallback = Arc<dyn Fn(&str, &StepResult) + Send + Sync>;

/// Options for running plans.
#[derive(Clone)]
pub struct OrchestratorOptions {
    /// Handlers simulate their effects; rollback never runs.
    pub dry_run: bool,
    /// Parallelism hint. Steps currently always run one at a time.
    pub concurrency: usize,
    /// Labels passed to every handler.
    pub global_labels: BTreeMap<String, String>,
    /// Timeout for steps that do not set their own.
    pub step_timeout: Option<Duration>,
    pub on_step_start: Option<StepStartCallback>,
    /// Fires only for steps whose handler was invoked. Skipped steps and
    /// steps failing reference resolution or handler lookup do not report.
    pub on_step_complete: Option<StepCompleteCallback>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 1,
            global_labels: BTreeMap::new(),
            step_timeout: None,
            on_step_start: None,
            on_step_complete: None,
        }
    }
}

impl std::fmt::Debug for OrchestratorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorOptions")
            .field("dry_run", &self.dry_run)
            .field("concurrency", &self.concurrency)
            .field("global_labels", &self.global_labels)
            .field("step_timeout", &self.step_timeout)
            .field("on_step_start", &self.on_step_start.is_some())
            .field("on_step_complete", &self.on_step_complete.is_some())
            .finish()
    }
}

/// Runs execution plans against a step type registry.
///
/// Per-run state lives inside each [`execute`](Orchestrator::execute) call,
/// so one orchestrator can run many plans, including concurrently.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<StepTypeRegistry>,
    options: OrchestratorOptions,
}

/// Mutable state of one plan run.
#[derive(Default)]
struct RunState {
    outputs: StepOutputs,
    results: Vec<StepResult>,
    by_id: HashMap<String, StepResult>,
    /// Step IDs in completion order.
    completed: Vec<String>,
    errors: Vec<String>,
    plan_failed: bool,
}

impl RunState {
    fn record(&mut self, result: StepResult) {
        if let Some(error) = &result.error {
            self.errors.push(format!("{}: {}", result.step_id, error));
        }
        if result.status == StepStatus::Failed {
            self.plan_failed = true;
        }
        self.by_id.insert(result.step_id.clone(), result.clone());
        self.results.push(result);
    }

    fn mark_rolled_back(&mut self, step_id: &str) {
        self.outputs.remove(step_id);
        self.completed.retain(|id| id != step_id);
        for result in self
            .results
            .iter_mut()
            .chain(self.by_id.values_mut())
            .filter(|r| r.step_id == step_id)
        {
            result.status = StepStatus::RolledBack;
        }
    }
}

impl Orchestrator {
    /// Create an orchestrator with default options.
    pub fn new(registry: Arc<StepTypeRegistry>) -> Self {
        Self::with_options(registry, OrchestratorOptions::default())
    }

    /// Create an orchestrator with the given options.
    pub fn with_options(registry: Arc<StepTypeRegistry>, options: OrchestratorOptions) -> Self {
        Self { registry, options }
    }

    /// Set dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    /// Set the parallelism hint.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    /// Add a label passed to every handler.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.global_labels.insert(key.into(), value.into());
        self
    }

    /// Set the timeout for steps that do not set their own.
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.options.step_timeout = Some(timeout);
        self
    }

    /// Set the step start callback.
    pub fn on_step_start(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.options.on_step_start = Some(Arc::new(callback));
        self
    }

    /// Set the step completion callback.
    ///
    /// Only steps whose handler ran are reported; see
    /// [`OrchestratorOptions::on_step_complete`].
    pub fn on_step_complete(
        mut self,
        callback: impl Fn(&str, &StepResult) + Send + Sync + 'static,
    ) -> Self {
        self.options.on_step_complete = Some(Arc::new(callback));
        self
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<StepTypeRegistry> {
        &self.registry
    }

    /// Run a plan.
    ///
    /// Never fails: validation, ordering and step errors are all reported
    /// through the returned result. A result with no steps means nothing
    /// ran.
    pub async fn execute(&self, plan: &ExecutionPlan) -> OrchestrationResult {
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!(
            plan_id = %plan.id,
            steps = plan.steps.len(),
            dry_run = self.options.dry_run,
            "Starting plan"
        );

        let errors = validate(plan, &self.registry);
        if !errors.is_empty() {
            for error in &errors {
                tracing::warn!(plan_id = %plan.id, "{}", error);
            }
            let state = RunState {
                errors,
                ..Default::default()
            };
            return self.finish(plan, state, started_at, start);
        }

        let order = match DependencyGraph::from_plan(plan).topological_order() {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(plan_id = %plan.id, error = %e, "Cannot order plan steps");
                let state = RunState {
                    errors: vec![e.to_string()],
                    ..Default::default()
                };
                return self.finish(plan, state, started_at, start);
            }
        };

        let mut state = RunState::default();
        for step_id in &order {
            if let Some(step) = plan.step(step_id) {
                self.run_step(plan, step, &mut state).await;
            }
        }

        self.finish(plan, state, started_at, start)
    }

    async fn run_step(&self, plan: &ExecutionPlan, step: &PlanStep, state: &mut RunState) {
        if state.plan_failed {
            tracing::debug!(step_id = %step.id, "Skipping step after earlier failure");
            state.record(StepResult::skipped(step));
            return;
        }

        if let Some(condition) = &step.condition {
            if !evaluate_condition(condition, &state.by_id) {
                tracing::info!(
                    step_id = %step.id,
                    condition_step = %condition.step_id,
                    "Condition not met, skipping step"
                );
                state.record(StepResult::skipped(step));
                return;
            }
        }

        let started_at = Utc::now();

        let params = match resolve(&step.params, &state.outputs) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(step_id = %step.id, error = %e, "Cannot resolve step parameters");
                state.record(StepResult::failed(step, e.to_string(), started_at));
                return;
            }
        };

        let Some(handler) = self.registry.get_handler(&step.step_type) else {
            let message = format!("No handler registered for step type '{}'", step.step_type);
            tracing::warn!(step_id = %step.id, "{}", message);
            state.record(StepResult::failed(step, message, started_at));
            return;
        };

        let mut ctx = StepContext::new(step.id.clone(), params);
        ctx.outputs = state.outputs.clone();
        ctx.dry_run = self.options.dry_run;
        ctx.labels = self.options.global_labels.clone();

        if let Some(callback) = &self.options.on_step_start {
            callback(&step.id);
        }

        let span = tracing::info_span!("step", step_id = %step.id, step_type = %step.step_type);
        let outcome = self
            .invoke(handler.as_ref(), &ctx, step)
            .instrument(span)
            .await;

        match outcome {
            Ok(outputs) => {
                let result = StepResult::completed(step, outputs.clone(), started_at);
                tracing::info!(step_id = %step.id, duration_ms = result.duration_ms, "Step completed");
                state.outputs.insert(step.id.clone(), outputs);
                state.completed.push(step.id.clone());
                state.record(result.clone());
                self.notify_complete(&step.id, &result);
            }
            Err(e) => {
                tracing::warn!(step_id = %step.id, error = %e, "Step failed");
                let result = StepResult::failed(step, e.to_string(), started_at);
                state.record(result.clone());
                self.notify_complete(&step.id, &result);

                if step.rollback_on_failure && !self.options.dry_run {
                    self.roll_back_completed(plan, state).await;
                }
            }
        }
    }

    /// Run the handler, bounded by the step's timeout or the default one.
    async fn invoke(
        &self,
        handler: &dyn StepHandler,
        ctx: &StepContext,
        step: &PlanStep,
    ) -> Result<Outputs> {
        let limit = step
            .timeout
            .map(Duration::from_millis)
            .or(self.options.step_timeout);

        match limit {
            Some(limit) => match tokio::time::timeout(limit, handler.execute(ctx)).await {
                Ok(result) => result,
                Err(_) => Err(PlanwrightError::StepTimeout {
                    step: step.id.clone(),
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => handler.execute(ctx).await,
        }
    }

    async fn roll_back_completed(&self, plan: &ExecutionPlan, state: &mut RunState) {
        let completed: Vec<&PlanStep> = state
            .completed
            .iter()
            .filter_map(|id| plan.step(id))
            .collect();
        if completed.is_empty() {
            return;
        }

        tracing::info!(plan_id = %plan.id, steps = completed.len(), "Rolling back completed steps");
        let report = roll_back(
            &self.registry,
            &completed,
            &state.outputs,
            &self.options.global_labels,
        )
        .await;

        if !report.is_clean() {
            tracing::warn!(
                plan_id = %plan.id,
                failed = report.failed.len(),
                "Rollback left some steps in place"
            );
        }
        for step_id in &report.rolled_back {
            state.mark_rolled_back(step_id);
        }
    }

    fn notify_complete(&self, step_id: &str, result: &StepResult) {
        if let Some(callback) = &self.options.on_step_complete {
            callback(step_id, result);
        }
    }

    fn finish(
        &self,
        plan: &ExecutionPlan,
        state: RunState,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> OrchestrationResult {
        // Nothing ran when validation or ordering failed
        let status = if state.results.is_empty() && !state.errors.is_empty() {
            OrchestrationStatus::Failed
        } else {
            OrchestrationStatus::from_steps(&state.results)
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            plan_id = %plan.id,
            status = %status,
            duration_ms,
            "Plan finished"
        );

        OrchestrationResult {
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            status,
            steps: state.results,
            outputs: state.outputs,
            errors: state.errors,
            duration_ms,
            started_at,
            completed_at: Utc::now(),
        }
    }
}
