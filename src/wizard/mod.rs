pub mod navigation;
pub mod staging;
pub mod steps;
pub mod store;
pub mod validator;

use std::fmt::Write;

use chrono::Utc;
use tracing::info;

use crate::error::{EditError, NavigationError};
use crate::models::{CategoryId, Coordinates, PropertyCatalog, PropertyDraft, SubCategoryId, UnitKind};
use crate::submission::{
    AuthContext, PendingSubmission, PropertyApi, SubmissionOutcome, SubmissionPipeline,
    SubmissionState,
};

pub use navigation::{Navigator, WizardPosition};
pub use staging::{ImageSelection, ImageStagingArea, StagedImage, StagingReport};
pub use steps::{DraftView, StepId};
pub use store::{DraftStore, WizardSnapshot, SNAPSHOT_VERSION};
pub use validator::Validation;

/// Coarse state of the wizard as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    Step(StepId),
    Submitting,
    Done(String),
}

pub struct Wizard {
    catalog: PropertyCatalog,
    draft: PropertyDraft,
    navigator: Navigator,
    staging: ImageStagingArea,
    submission: SubmissionPipeline,
}

impl Wizard {
    /// Enter the wizard with an empty draft
    pub fn new(catalog: PropertyCatalog, max_image_bytes: u64) -> Self {
        let draft = PropertyDraft::default();
        let staging = ImageStagingArea::new(max_image_bytes);
        let navigator = Navigator::new(&DraftView::new(&catalog, &draft, staging.images()));
        Self {
            catalog,
            draft,
            navigator,
            staging,
            submission: SubmissionPipeline::new(),
        }
    }

    /// Resume from a saved snapshot. Staged images whose files can no longer be
    /// read are reported and dropped.
    pub fn restore(
        catalog: PropertyCatalog,
        max_image_bytes: u64,
        snapshot: WizardSnapshot,
    ) -> (Self, StagingReport) {
        let mut staging = ImageStagingArea::new(max_image_bytes);
        let report = staging.restore(snapshot.staged_images);
        let draft = snapshot.draft;
        let navigator = Navigator::restore(
            snapshot.position.current_step,
            &DraftView::new(&catalog, &draft, staging.images()),
        );
        info!("Resuming wizard at {}", navigator.current().title());
        let wizard = Self {
            catalog,
            draft,
            navigator,
            staging,
            submission: SubmissionPipeline::new(),
        };
        (wizard, report)
    }

    pub fn snapshot(&self, session_key: &str) -> WizardSnapshot {
        WizardSnapshot {
            version: SNAPSHOT_VERSION,
            session_key: session_key.to_string(),
            saved_at: Utc::now(),
            draft: self.draft.clone(),
            position: self.position(),
            staged_images: self.staging.persisted(),
        }
    }

    pub fn view(&self) -> DraftView<'_> {
        DraftView::new(&self.catalog, &self.draft, self.staging.images())
    }

    pub fn catalog(&self) -> &PropertyCatalog {
        &self.catalog
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    pub fn staging(&self) -> &ImageStagingArea {
        &self.staging
    }

    pub fn current_step(&self) -> StepId {
        self.navigator.current()
    }

    pub fn position(&self) -> WizardPosition {
        self.navigator.position(&self.view())
    }

    pub fn submission_state(&self) -> &SubmissionState {
        self.submission.state()
    }

    pub fn phase(&self) -> WizardPhase {
        match self.submission.state() {
            SubmissionState::InFlight => WizardPhase::Submitting,
            SubmissionState::Succeeded(id) => WizardPhase::Done(id.clone()),
            _ => WizardPhase::Step(self.navigator.current()),
        }
    }

    // Editing. Every edit belongs to one step and is only accepted while that
    // step is the current one.

    fn require_step(&self, step: StepId) -> Result<(), EditError> {
        let active = self.navigator.current();
        if active != step {
            return Err(EditError::InactiveStep {
                active,
                requested: step,
            });
        }
        Ok(())
    }

    pub fn select_category(&mut self, category: CategoryId) -> Result<(), EditError> {
        self.require_step(StepId::Category)?;
        if !self.catalog.is_known(&category) {
            return Err(EditError::UnknownCategory(category));
        }
        self.draft.select_category(&self.catalog, category);
        Ok(())
    }

    pub fn select_sub_category(&mut self, sub: SubCategoryId) -> Result<(), EditError> {
        self.require_step(StepId::SubCategory)?;
        let category = self
            .draft
            .category
            .clone()
            .ok_or(EditError::NoCategorySelected)?;
        if !self.catalog.contains_sub_category(&category, &sub) {
            return Err(EditError::UnknownSubCategory { category, sub });
        }
        self.draft.sub_category = Some(sub);
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), EditError> {
        self.require_step(StepId::Title)?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditError> {
        self.require_step(StepId::Title)?;
        self.draft.description = description.into();
        Ok(())
    }

    pub fn set_unit_count(&mut self, kind: UnitKind, count: u32) -> Result<(), EditError> {
        self.require_step(StepId::Units)?;
        self.draft.structural_units.set(kind, count);
        Ok(())
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), EditError> {
        self.require_step(StepId::Location)?;
        self.draft.location.address = address.into();
        Ok(())
    }

    pub fn set_coordinates(&mut self, lat: f64, lng: f64) -> Result<(), EditError> {
        self.require_step(StepId::Location)?;
        self.draft.location.coordinates = Some(Coordinates::new(lat, lng)?);
        Ok(())
    }

    pub fn clear_coordinates(&mut self) -> Result<(), EditError> {
        self.require_step(StepId::Location)?;
        self.draft.location.coordinates = None;
        Ok(())
    }

    pub fn add_images(
        &mut self,
        files: impl IntoIterator<Item = ImageSelection>,
    ) -> Result<StagingReport, EditError> {
        self.require_step(StepId::Images)?;
        Ok(self.staging.add_images(files))
    }

    pub fn remove_image(&mut self, client_id: &str) -> Result<bool, EditError> {
        self.require_step(StepId::Images)?;
        Ok(self.staging.remove_image(client_id))
    }

    pub fn reorder_image(&mut self, client_id: &str, new_index: usize) -> Result<bool, EditError> {
        self.require_step(StepId::Images)?;
        Ok(self.staging.reorder(client_id, new_index))
    }

    // Navigation

    pub fn validate_current(&self) -> Validation {
        self.navigator.current().validate(&self.view())
    }

    pub fn go_next(&mut self) -> Result<StepId, NavigationError> {
        let view = DraftView::new(&self.catalog, &self.draft, self.staging.images());
        let step = self.navigator.go_next(&view)?;
        info!("Moved to {}", step.title());
        Ok(step)
    }

    pub fn go_back(&mut self) -> StepId {
        let view = DraftView::new(&self.catalog, &self.draft, self.staging.images());
        self.navigator.go_back(&view)
    }

    pub fn go_to(&mut self, step: StepId) -> Result<StepId, NavigationError> {
        let view = DraftView::new(&self.catalog, &self.draft, self.staging.images());
        self.navigator.go_to(step, &view)
    }

    pub fn is_terminal(&self) -> bool {
        self.navigator.is_terminal()
    }

    pub fn unlocked_steps(&self) -> Vec<StepId> {
        Navigator::unlocked_steps(&self.view())
    }

    // Submission

    /// Start submitting the draft. See [`SubmissionPipeline::begin`].
    pub fn begin_submission(&mut self, auth: &dyn AuthContext) -> Option<PendingSubmission> {
        let view = DraftView::new(&self.catalog, &self.draft, self.staging.images());
        self.submission.begin(&view, auth)
    }

    /// Apply a resolved attempt. Success empties the draft and staging area.
    pub fn apply_submission(
        &mut self,
        outcome: SubmissionOutcome,
        auth: &dyn AuthContext,
    ) -> &SubmissionState {
        self.submission.apply(outcome, auth);
        if self.submission.state().property_id().is_some() {
            self.clear_session();
        }
        self.submission.state()
    }

    /// Submit and wait for the result
    pub async fn submit(
        &mut self,
        api: &dyn PropertyApi,
        auth: &dyn AuthContext,
    ) -> &SubmissionState {
        if let Some(pending) = self.begin_submission(auth) {
            let outcome = pending.send(api).await;
            self.apply_submission(outcome, auth);
        }
        self.submission.state()
    }

    /// Discard the draft and staged images and return to the first step
    pub fn start_over(&mut self) {
        info!("Starting over");
        self.clear_session();
        self.submission.reset();
    }

    fn clear_session(&mut self) {
        self.draft = PropertyDraft::default();
        self.staging.clear();
        self.navigator = Navigator::new(&DraftView::new(
            &self.catalog,
            &self.draft,
            self.staging.images(),
        ));
    }

    /// Plain-text rendering of the current phase
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self.phase() {
            WizardPhase::Submitting => out.push_str("Submitting property...\n"),
            WizardPhase::Done(id) => {
                let _ = writeln!(out, "Property created (id {id}).");
                out.push_str("Run `start-over` to list another property.\n");
            }
            WizardPhase::Step(step) => {
                let view = self.view();
                let steps = view.effective_steps();
                let number = steps.iter().position(|s| *s == step).map_or(0, |i| i + 1);
                let _ = writeln!(out, "Step {number} of {}: {}", steps.len(), step.title());
                out.push_str(&step.render(&view));
                if let Some(failure) = self.submission.state().failure() {
                    let _ = writeln!(out, "Last submission failed: {}", failure.message);
                }
            }
        }
        out
    }
}
