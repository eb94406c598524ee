//! Step condition evaluation.

use std::collections::HashMap;

use crate::plan::{ConditionCheck, StepCondition};

use super::result::{StepResult, StepStatus};

/// Evaluate a condition against the results recorded so far.
///
/// A step with no recorded result never satisfies a condition.
pub fn evaluate_condition(
    condition: &StepCondition,
    results: &HashMap<String, StepResult>,
) -> bool {
    let Some(result) = results.get(&condition.step_id) else {
        return false;
    };

    match condition.check {
        ConditionCheck::Succeeded | ConditionCheck::Completed => {
            result.status == StepStatus::Completed
        }
        ConditionCheck::Failed => result.status == StepStatus::Failed,
        ConditionCheck::Skipped => result.status == StepStatus::Skipped,
        ConditionCheck::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanStep;
    use chrono::Utc;

    fn results(status: StepStatus) -> HashMap<String, StepResult> {
        let step = PlanStep::new("a", "noop");
        let mut result = StepResult::skipped(&step);
        result.status = status;
        HashMap::from([("a".to_string(), result)])
    }

    fn condition(check: ConditionCheck) -> StepCondition {
        StepCondition {
            step_id: "a".to_string(),
            check,
        }
    }

    #[test]
    fn missing_result_is_false() {
        let empty = HashMap::new();
        assert!(!evaluate_condition(&condition(ConditionCheck::Completed), &empty));
        assert!(!evaluate_condition(&condition(ConditionCheck::Skipped), &empty));
    }

    #[test]
    fn succeeded_and_completed_are_synonyms() {
        let completed = results(StepStatus::Completed);
        assert!(evaluate_condition(&condition(ConditionCheck::Succeeded), &completed));
        assert!(evaluate_condition(&condition(ConditionCheck::Completed), &completed));
        assert!(!evaluate_condition(&condition(ConditionCheck::Failed), &completed));
    }

    #[test]
    fn failed_and_skipped_match_directly() {
        let step = PlanStep::new("a", "noop");
        let failed = HashMap::from([(
            "a".to_string(),
            StepResult::failed(&step, "boom", Utc::now()),
        )]);
        assert!(evaluate_condition(&condition(ConditionCheck::Failed), &failed));
        assert!(evaluate_condition(
            &condition(ConditionCheck::Skipped),
            &results(StepStatus::Skipped)
        ));
    }

    #[test]
    fn unknown_check_is_false() {
        assert!(!evaluate_condition(
            &condition(ConditionCheck::Unknown),
            &results(StepStatus::Completed)
        ));
    }
}
