use std::fmt::Write;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::models::{PropertyCatalog, PropertyDraft, MAX_TITLE_CHARS};
use crate::wizard::staging::StagedImage;
use crate::wizard::validator::{self, Validation};

/// Wizard steps, in the order they are presented
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepId {
    Category,
    SubCategory,
    Title,
    Units,
    Location,
    Images,
    Preview,
}

impl StepId {
    pub const ALL: [Self; 7] = [
        Self::Category,
        Self::SubCategory,
        Self::Title,
        Self::Units,
        Self::Location,
        Self::Images,
        Self::Preview,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Category => 0,
            Self::SubCategory => 1,
            Self::Title => 2,
            Self::Units => 3,
            Self::Location => 4,
            Self::Images => 5,
            Self::Preview => 6,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::SubCategory => "Subcategory",
            Self::Title => "Title",
            Self::Units => "Structural units",
            Self::Location => "Location",
            Self::Images => "Images",
            Self::Preview => "Preview",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Category => "What kind of property are you listing?",
            Self::SubCategory => "Narrow it down to a subcategory.",
            Self::Title => "Give the property a short title (up to 40 characters).",
            Self::Units => "How many of each unit does the property have? All optional.",
            Self::Location => "Type an address or pick a point on the map.",
            Self::Images => "Add at least one photo. The first one becomes the cover.",
            Self::Preview => "Review everything, then submit.",
        }
    }

    /// Whether the step is part of the flow for this draft
    pub fn applies_to(self, view: &DraftView<'_>) -> bool {
        match self {
            Self::SubCategory => view
                .draft
                .category
                .as_ref()
                .is_some_and(|category| view.catalog.has_sub_categories(category)),
            _ => true,
        }
    }

    pub fn validate(self, view: &DraftView<'_>) -> Validation {
        validator::validate(self, view)
    }

    pub fn is_satisfied(self, view: &DraftView<'_>) -> bool {
        self.validate(view).valid
    }

    /// Plain-text rendering of the step body
    pub fn render(self, view: &DraftView<'_>) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render_into(&mut out, view);
        out
    }

    fn render_into(self, out: &mut String, view: &DraftView<'_>) -> std::fmt::Result {
        let draft = view.draft;
        writeln!(out, "{}", self.description())?;
        match self {
            Self::Category => {
                for category in view.catalog.categories() {
                    let marker = checkbox(draft.category.as_ref() == Some(&category.id));
                    match category.sub_categories.len() {
                        0 => writeln!(out, "  {marker} {}", category.id)?,
                        n => writeln!(out, "  {marker} {} ({n} subcategories)", category.id)?,
                    }
                }
            }
            Self::SubCategory => {
                if let Some(category) = &draft.category {
                    for sub in view.catalog.sub_categories(category) {
                        let marker = checkbox(draft.sub_category.as_ref() == Some(sub));
                        writeln!(out, "  {marker} {sub}")?;
                    }
                }
            }
            Self::Title => {
                writeln!(
                    out,
                    "  Title ({}/{MAX_TITLE_CHARS}): {}",
                    draft.title_chars(),
                    draft.title
                )?;
                if !draft.description.is_empty() {
                    writeln!(out, "  Description: {}", draft.description)?;
                }
            }
            Self::Units => {
                for (kind, count) in draft.structural_units.iter() {
                    writeln!(out, "  {:<16} {count}", kind.label())?;
                }
            }
            Self::Location => write_location(out, draft)?,
            Self::Images => write_images(out, view.images)?,
            Self::Preview => {
                writeln!(out, "  Category:    {}", display_or_dash(&draft.category))?;
                writeln!(out, "  Subcategory: {}", display_or_dash(&draft.sub_category))?;
                writeln!(out, "  Title:       {}", draft.title)?;
                if !draft.description.is_empty() {
                    writeln!(out, "  Description: {}", draft.description)?;
                }
                let units: Vec<String> = draft
                    .structural_units
                    .iter()
                    .filter(|(_, count)| *count > 0)
                    .map(|(kind, count)| format!("{} {count}", kind.label()))
                    .collect();
                if units.is_empty() {
                    writeln!(out, "  Units:       -")?;
                } else {
                    writeln!(out, "  Units:       {}", units.join(", "))?;
                }
                write_location(out, draft)?;
                write_images(out, view.images)?;
            }
        }
        Ok(())
    }
}

/// Everything step predicates and renderers are allowed to look at
#[derive(Debug, Clone, Copy)]
pub struct DraftView<'a> {
    pub catalog: &'a PropertyCatalog,
    pub draft: &'a PropertyDraft,
    pub images: &'a [StagedImage],
}

impl<'a> DraftView<'a> {
    pub fn new(
        catalog: &'a PropertyCatalog,
        draft: &'a PropertyDraft,
        images: &'a [StagedImage],
    ) -> Self {
        Self {
            catalog,
            draft,
            images,
        }
    }

    /// Steps that apply to the draft, in order
    pub fn effective_steps(&self) -> Vec<StepId> {
        StepId::ALL
            .into_iter()
            .filter(|step| step.applies_to(self))
            .collect()
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn display_or_dash<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string)
}

fn write_location(out: &mut String, draft: &PropertyDraft) -> std::fmt::Result {
    let address = draft.location.address.trim();
    writeln!(
        out,
        "  Address:     {}",
        if address.is_empty() { "-" } else { address }
    )?;
    match draft.location.coordinates {
        Some(point) => writeln!(out, "  Coordinates: {:.6}, {:.6}", point.lat, point.lng),
        None => writeln!(out, "  Coordinates: -"),
    }
}

fn write_images(out: &mut String, images: &[StagedImage]) -> std::fmt::Result {
    if images.is_empty() {
        return writeln!(out, "  No images staged");
    }
    for (i, image) in images.iter().enumerate() {
        let cover = if i == 0 { " (cover)" } else { "" };
        writeln!(
            out,
            "  {}. {} [{}]{cover}",
            i + 1,
            image.file_name(),
            image.client_id()
        )?;
    }
    Ok(())
}
