pub mod config;
pub mod error;
pub mod models;
pub mod submission;
pub mod wizard;

pub use config::WizardConfig;
pub use error::{EditError, NavigationError, StagingError, StoreError, SubmissionError};
pub use models::{CategoryId, PropertyCatalog, PropertyDraft, SubCategoryId, UnitKind};
pub use submission::{
    AuthContext, HttpPropertyApi, PropertyApi, StaticToken, SubmissionState,
};
pub use wizard::{DraftStore, ImageSelection, StepId, Wizard, WizardPhase};
