use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use property_wizard::models::UnitKind;
use property_wizard::submission::{HttpPropertyApi, StaticToken, SubmissionState};
use property_wizard::wizard::{ImageSelection, StagingReport, StepId, Wizard};
use property_wizard::WizardConfig;

#[derive(Parser)]
#[command(
    name = "property-wizard",
    version,
    about = "Guided property creation for the property-manager portal"
)]
pub struct Cli {
    /// Wizard session to resume (overrides the configured session key)
    #[arg(long, global = true)]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the current step
    Show,
    /// List the steps and which ones can be reached
    Steps,
    /// Choose the property category
    Category { id: String },
    /// Choose the subcategory of the selected category
    Subcategory { id: String },
    /// Set the property title (up to 40 characters)
    Title { text: String },
    /// Set the optional description
    Description { text: String },
    /// Set the count of one structural unit, e.g. `units meeting_rooms 4`
    Units { kind: UnitKind, count: u32 },
    /// Set the street address
    Address { text: String },
    /// Pick a point on the map
    Coordinates {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Remove the picked map point
    ClearCoordinates,
    /// Stage image files
    AddImages {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove a staged image
    RemoveImage { client_id: String },
    /// Move a staged image; position 0 is the cover
    ReorderImage { client_id: String, index: usize },
    /// Continue to the next step
    Next,
    /// Return to the previous step
    Back,
    /// Jump to a step whose predecessors are complete
    Goto { step: StepId },
    /// Create the property
    Submit,
    /// Discard the draft and begin again
    StartOver,
}

/// What to do with the saved session after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Save,
    Clear,
}

pub async fn execute(command: Command, wizard: &mut Wizard, config: &WizardConfig) -> Result<Effect> {
    let edit = match command {
        Command::Show => Ok(()),
        Command::Steps => {
            print_steps(wizard);
            Ok(())
        }
        Command::Category { id } => wizard.select_category(id.as_str().into()),
        Command::Subcategory { id } => wizard.select_sub_category(id.as_str().into()),
        Command::Title { text } => wizard.set_title(text),
        Command::Description { text } => wizard.set_description(text),
        Command::Units { kind, count } => wizard.set_unit_count(kind, count),
        Command::Address { text } => wizard.set_address(text),
        Command::Coordinates { lat, lng } => wizard.set_coordinates(lat, lng),
        Command::ClearCoordinates => wizard.clear_coordinates(),
        Command::AddImages { paths } => wizard
            .add_images(paths.into_iter().map(ImageSelection::Path))
            .map(|report| print_staging_report(&report)),
        Command::RemoveImage { client_id } => wizard.remove_image(&client_id).map(|removed| {
            if !removed {
                println!("No staged image with id {client_id}");
            }
        }),
        Command::ReorderImage { client_id, index } => {
            wizard.reorder_image(&client_id, index).map(|moved| {
                if !moved {
                    println!("No staged image with id {client_id}");
                }
            })
        }
        Command::Next => {
            if let Err(e) = wizard.go_next() {
                println!("✗ {e}");
            }
            Ok(())
        }
        Command::Back => {
            wizard.go_back();
            Ok(())
        }
        Command::Goto { step } => {
            if let Err(e) = wizard.go_to(step) {
                println!("✗ {e}");
            }
            Ok(())
        }
        Command::Submit => return submit(wizard, config).await,
        Command::StartOver => {
            wizard.start_over();
            return Ok(Effect::Clear);
        }
    };

    if let Err(e) = edit {
        println!("✗ {e}");
    }
    Ok(Effect::Save)
}

async fn submit(wizard: &mut Wizard, config: &WizardConfig) -> Result<Effect> {
    let api = HttpPropertyApi::from_config(config)?;
    let auth = StaticToken::new(config.auth_token.clone());

    match wizard.submit(&api, &auth).await {
        SubmissionState::Succeeded(id) => {
            println!("✅ Property created: {id}");
            Ok(Effect::Clear)
        }
        SubmissionState::Failed(failure) => {
            println!("✗ Submission failed: {}", failure.message);
            if auth.reauthentication_requested() {
                println!("Sign in again and set PROPERTY_WIZARD_AUTH_TOKEN, then retry `submit`.");
            }
            Ok(Effect::Save)
        }
        state => {
            info!("Submission state after submit: {:?}", state);
            Ok(Effect::Save)
        }
    }
}

fn print_steps(wizard: &Wizard) {
    let position = wizard.position();
    for step in StepId::ALL {
        let marker = if step == position.current_step {
            ">"
        } else if position.unlocked.contains(&step) {
            " "
        } else if position.steps.contains(&step) {
            "🔒"
        } else {
            "-"
        };
        println!("{marker} {:<12} {}", step.to_string(), step.title());
    }
}

fn print_staging_report(report: &StagingReport) {
    for id in &report.added {
        println!("Staged image {id}");
    }
    for rejected in &report.rejected {
        println!("✗ {rejected}");
    }
}
