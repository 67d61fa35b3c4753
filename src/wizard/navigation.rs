use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NavigationError;
use crate::wizard::steps::{DraftView, StepId};

/// Where the user is in the wizard and which steps they can reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardPosition {
    pub current_step: StepId,
    pub steps: Vec<StepId>,
    pub unlocked: Vec<StepId>,
}

/// Tracks the current step and enforces gating between steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: StepId,
}

impl Navigator {
    /// Start on the first applicable step
    pub fn new(view: &DraftView<'_>) -> Self {
        let current = view
            .effective_steps()
            .first()
            .copied()
            .unwrap_or(StepId::Category);
        Self { current }
    }

    /// Resume at `step`, or at the furthest reachable step when `step` is no
    /// longer applicable or unlocked for this draft.
    pub fn restore(step: StepId, view: &DraftView<'_>) -> Self {
        let unlocked = Self::unlocked_steps(view);
        if unlocked.contains(&step) {
            return Self { current: step };
        }
        let current = unlocked.last().copied().unwrap_or(StepId::Category);
        debug!(requested = %step, resumed = %current, "restored step is not reachable");
        Self { current }
    }

    pub fn current(&self) -> StepId {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.current == StepId::Preview
    }

    pub fn position(&self, view: &DraftView<'_>) -> WizardPosition {
        WizardPosition {
            current_step: self.current,
            steps: view.effective_steps(),
            unlocked: Self::unlocked_steps(view),
        }
    }

    /// Applicable steps whose predecessors are all satisfied
    pub fn unlocked_steps(view: &DraftView<'_>) -> Vec<StepId> {
        let mut unlocked = Vec::new();
        for step in view.effective_steps() {
            unlocked.push(step);
            if !step.is_satisfied(view) {
                break;
            }
        }
        unlocked
    }

    /// Advance past the current step if it is satisfied
    pub fn go_next(&mut self, view: &DraftView<'_>) -> Result<StepId, NavigationError> {
        let validation = self.current.validate(view);
        if !validation.valid {
            return Err(NavigationError::Blocked {
                step: self.current,
                reason: validation.reason.unwrap_or_default(),
            });
        }
        let next = StepId::ALL[self.current.index() + 1..]
            .iter()
            .copied()
            .find(|step| step.applies_to(view))
            .ok_or(NavigationError::NoNextStep)?;
        self.current = next;
        Ok(next)
    }

    /// Retreat to the previous applicable step. Never blocked.
    pub fn go_back(&mut self, view: &DraftView<'_>) -> StepId {
        if let Some(previous) = StepId::ALL[..self.current.index()]
            .iter()
            .rev()
            .copied()
            .find(|step| step.applies_to(view))
        {
            self.current = previous;
        }
        self.current
    }

    /// Jump to `target` when every applicable step before it is satisfied
    pub fn go_to(&mut self, target: StepId, view: &DraftView<'_>) -> Result<StepId, NavigationError> {
        if !target.applies_to(view) {
            return Err(NavigationError::NotApplicable(target));
        }
        for step in view.effective_steps() {
            if step == target {
                break;
            }
            let validation = step.validate(view);
            if !validation.valid {
                return Err(NavigationError::Blocked {
                    step,
                    reason: validation.reason.unwrap_or_default(),
                });
            }
        }
        self.current = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyCatalog, PropertyDraft};

    fn view<'a>(catalog: &'a PropertyCatalog, draft: &'a PropertyDraft) -> DraftView<'a> {
        DraftView::new(catalog, draft, &[])
    }

    #[test]
    fn starts_on_category() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft::default();
        assert_eq!(Navigator::new(&view(&catalog, &draft)).current(), StepId::Category);
    }

    #[test]
    fn go_next_is_blocked_by_incomplete_step() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft::default();
        let mut nav = Navigator::new(&view(&catalog, &draft));

        let err = nav.go_next(&view(&catalog, &draft)).unwrap_err();
        assert!(matches!(err, NavigationError::Blocked { step: StepId::Category, .. }));
        assert_eq!(nav.current(), StepId::Category);
    }

    #[test]
    fn skips_subcategory_for_land() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft {
            category: Some("Land".into()),
            ..Default::default()
        };
        let mut nav = Navigator::new(&view(&catalog, &draft));

        assert_eq!(nav.go_next(&view(&catalog, &draft)), Ok(StepId::Title));
        assert_eq!(nav.go_back(&view(&catalog, &draft)), StepId::Category);
    }

    #[test]
    fn go_back_on_first_step_stays() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft::default();
        let mut nav = Navigator::new(&view(&catalog, &draft));
        assert_eq!(nav.go_back(&view(&catalog, &draft)), StepId::Category);
    }

    #[test]
    fn go_to_reports_first_blocking_step() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft {
            category: Some("Land".into()),
            title: "Plot by the lake".into(),
            ..Default::default()
        };
        let mut nav = Navigator::new(&view(&catalog, &draft));

        assert_eq!(nav.go_to(StepId::Location, &view(&catalog, &draft)), Ok(StepId::Location));
        let err = nav.go_to(StepId::Preview, &view(&catalog, &draft)).unwrap_err();
        assert!(matches!(err, NavigationError::Blocked { step: StepId::Location, .. }));
        assert_eq!(nav.current(), StepId::Location);

        let err = nav.go_to(StepId::SubCategory, &view(&catalog, &draft)).unwrap_err();
        assert_eq!(err, NavigationError::NotApplicable(StepId::SubCategory));
    }

    #[test]
    fn unlocked_steps_stop_at_first_incomplete() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft {
            category: Some("Office".into()),
            ..Default::default()
        };
        assert_eq!(
            Navigator::unlocked_steps(&view(&catalog, &draft)),
            vec![StepId::Category, StepId::SubCategory]
        );
    }

    #[test]
    fn restore_clamps_unreachable_step() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft {
            category: Some("Office".into()),
            ..Default::default()
        };
        let nav = Navigator::restore(StepId::Images, &view(&catalog, &draft));
        assert_eq!(nav.current(), StepId::SubCategory);

        let nav = Navigator::restore(StepId::Category, &view(&catalog, &draft));
        assert_eq!(nav.current(), StepId::Category);
    }

    #[test]
    fn no_step_after_preview() {
        let catalog = PropertyCatalog::standard();
        let draft = PropertyDraft::default();
        let mut nav = Navigator {
            current: StepId::Preview,
        };
        assert!(nav.is_terminal());
        assert_eq!(nav.go_next(&view(&catalog, &draft)), Err(NavigationError::NoNextStep));
    }
}
