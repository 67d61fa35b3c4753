use crate::models::MAX_TITLE_CHARS;
use crate::wizard::steps::{DraftView, StepId};

/// Result of checking one step against the current draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Check whether `step` is complete for the draft in `view`.
///
/// Pure over the view: nothing is mutated and no other step's data is consulted
/// beyond what the step itself depends on.
pub fn validate(step: StepId, view: &DraftView<'_>) -> Validation {
    let draft = view.draft;
    match step {
        StepId::Category => match &draft.category {
            None => Validation::invalid("choose a category"),
            Some(category) if !view.catalog.is_known(category) => {
                Validation::invalid(format!("{category} is not a recognized category"))
            }
            Some(_) => Validation::ok(),
        },
        StepId::SubCategory => match (&draft.category, &draft.sub_category) {
            (None, _) => Validation::invalid("choose a category first"),
            (Some(_), None) => Validation::invalid("choose a subcategory"),
            (Some(category), Some(sub)) => {
                if view.catalog.contains_sub_category(category, sub) {
                    Validation::ok()
                } else {
                    Validation::invalid(format!("{sub} is not a subcategory of {category}"))
                }
            }
        },
        StepId::Title => {
            let chars = draft.title_chars();
            if draft.title.trim().is_empty() {
                Validation::invalid("enter a title")
            } else if chars > MAX_TITLE_CHARS {
                Validation::invalid(format!(
                    "title is {chars} characters, the limit is {MAX_TITLE_CHARS}"
                ))
            } else {
                Validation::ok()
            }
        }
        StepId::Units => Validation::ok(),
        StepId::Location => {
            if draft.location.is_set() {
                Validation::ok()
            } else {
                Validation::invalid("enter an address or pick a point on the map")
            }
        }
        StepId::Images => {
            if view.images.is_empty() {
                Validation::invalid("add at least one image")
            } else {
                Validation::ok()
            }
        }
        StepId::Preview => Validation::ok(),
    }
}
