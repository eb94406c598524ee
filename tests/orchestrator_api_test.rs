//! Integration tests for running plans through the public API.

use planwright::engine::{OrchestrationStatus, Orchestrator, StepStatus};
use planwright::plan::{ConditionCheck, ExecutionPlan, PlanStep};
use planwright::registry::{
    register_builtins, ManagerFactories, MemoryResourceManager, ResourceManager, StepTypeRegistry,
};
use std::sync::{Arc, Mutex};

fn builtin_orchestrator() -> (Orchestrator, Arc<MemoryResourceManager>) {
    let registry = StepTypeRegistry::new();
    let manager = Arc::new(MemoryResourceManager::new());
    let shared: Arc<dyn ResourceManager> = manager.clone();
    register_builtins(&registry, &ManagerFactories::shared(shared)).unwrap();
    (Orchestrator::new(Arc::new(registry)), manager)
}

fn web_stack() -> ExecutionPlan {
    ExecutionPlan::new("web", "Web stack")
        .with_step(
            PlanStep::new("vpc", "network.vpc")
                .with_param("name", "main")
                .with_param("cidr", "10.0.0.0/16"),
        )
        .with_step(
            PlanStep::new("subnet", "network.subnet")
                .with_param("vpc_id", "$step.vpc.vpc_id")
                .with_param("cidr", "10.0.1.0/24"),
        )
        .with_step(
            PlanStep::new("db", "database.instance")
                .with_param("name", "orders")
                .with_param("engine", "postgres")
                .depends_on("subnet"),
        )
        .with_step(
            PlanStep::new("app", "compute.instance")
                .with_param("name", "web-1")
                .with_param("image", "ubuntu-24.04")
                .with_param("subnet_id", "$step.subnet.subnet_id")
                .depends_on("db")
                .rollback_on_failure(),
        )
}

#[tokio::test]
async fn full_provisioning_workflow() {
    let (orchestrator, manager) = builtin_orchestrator();

    let result = orchestrator.execute(&web_stack()).await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert!(result.errors.is_empty());
    assert_eq!(manager.len(), 4);
    assert_eq!(result.outputs["vpc"]["vpc_id"], "vpc-0001");
    assert_eq!(result.outputs["db"]["port"], 5432);

    let kinds: Vec<_> = manager.resources().into_iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            "network.vpc",
            "network.subnet",
            "database.instance",
            "compute.instance"
        ]
    );
}

#[tokio::test]
async fn failing_step_rolls_back_created_resources() {
    let (orchestrator, manager) = builtin_orchestrator();
    manager.fail_on("compute.instance", "quota exceeded");

    let result = orchestrator.execute(&web_stack()).await;

    assert_eq!(result.status, OrchestrationStatus::RolledBack);
    assert!(manager.is_empty());
    assert_eq!(
        result.steps_with_status(StepStatus::RolledBack),
        vec!["vpc", "subnet", "db"]
    );
    assert_eq!(result.step("app").unwrap().status, StepStatus::Failed);
    assert!(result.errors[0].starts_with("app: "));
    assert!(result.errors[0].contains("quota exceeded"));
    assert!(result.outputs.is_empty());
}

#[tokio::test]
async fn failure_without_rollback_keeps_resources() {
    let (orchestrator, manager) = builtin_orchestrator();
    manager.fail_on("database.instance", "engine unavailable");

    let result = orchestrator.execute(&web_stack()).await;

    assert_eq!(result.status, OrchestrationStatus::Partial);
    assert_eq!(manager.len(), 2);
    assert_eq!(result.step("app").unwrap().status, StepStatus::Skipped);
    assert_eq!(result.outputs.len(), 2);
}

#[tokio::test]
async fn dry_run_creates_nothing() {
    let (orchestrator, manager) = builtin_orchestrator();

    let result = orchestrator.dry_run(true).execute(&web_stack()).await;

    assert!(result.is_success());
    assert!(manager.is_empty());
    assert_eq!(
        result.outputs["app"]["instance_id"],
        "dry-run-app-instance_id"
    );
}

#[tokio::test]
async fn condition_skips_dependent_work() {
    let (orchestrator, manager) = builtin_orchestrator();
    let plan = ExecutionPlan::new("assets", "Assets")
        .with_step(PlanStep::new("bucket", "storage.bucket").with_param("name", "assets"))
        .with_step(
            PlanStep::new("cleanup", "storage.bucket")
                .with_param("name", "fallback")
                .with_condition("bucket", ConditionCheck::Failed),
        );

    let result = orchestrator.execute(&plan).await;

    assert_eq!(result.status, OrchestrationStatus::Completed);
    assert_eq!(result.step("cleanup").unwrap().status, StepStatus::Skipped);
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn invalid_plan_touches_nothing() {
    let (orchestrator, manager) = builtin_orchestrator();
    let plan = ExecutionPlan::new("broken", "Broken")
        .with_step(PlanStep::new("vpc", "network.vpc").with_param("name", "main"));

    let result = orchestrator.execute(&plan).await;

    assert_eq!(result.status, OrchestrationStatus::Failed);
    assert!(result.steps.is_empty());
    assert!(manager.is_empty());
    assert!(result.errors[0].contains("missing required parameter 'cidr'"));
}

#[tokio::test]
async fn callbacks_observe_each_step() {
    let (orchestrator, _) = builtin_orchestrator();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let started = Arc::clone(&seen);
    let finished = Arc::clone(&seen);

    let result = orchestrator
        .on_step_start(move |id| started.lock().unwrap().push(format!("start:{}", id)))
        .on_step_complete(move |id, result| {
            finished
                .lock()
                .unwrap()
                .push(format!("{}:{}", result.status, id))
        })
        .execute(&web_stack())
        .await;

    assert!(result.is_success());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 8);
    assert_eq!(seen[0], "start:vpc");
    assert_eq!(seen[1], "completed:vpc");
}
