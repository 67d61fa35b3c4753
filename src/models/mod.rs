pub mod catalog;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::EditError;

pub use catalog::{CategoryDefinition, PropertyCatalog};

/// Maximum number of characters accepted for a property title
pub const MAX_TITLE_CHARS: usize = 40;

/// Identifier of a top-level property category (e.g. "Office")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a subcategory, only meaningful relative to its category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubCategoryId(String);

impl SubCategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubCategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubCategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kinds of structural units a property can declare a count for
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
pub enum UnitKind {
    Floors,
    Restrooms,
    Offices,
    MeetingRooms,
    Lobbies,
    BreakRooms,
    Cafeteria,
    Gym,
    Bedrooms,
    Bathrooms,
    Kitchens,
    ParkingSpaces,
}

impl UnitKind {
    /// Human readable label used when rendering the units step
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Floors => "Floors",
            UnitKind::Restrooms => "Restrooms",
            UnitKind::Offices => "Offices",
            UnitKind::MeetingRooms => "Meeting rooms",
            UnitKind::Lobbies => "Lobbies",
            UnitKind::BreakRooms => "Break rooms",
            UnitKind::Cafeteria => "Cafeteria",
            UnitKind::Gym => "Gym",
            UnitKind::Bedrooms => "Bedrooms",
            UnitKind::Bathrooms => "Bathrooms",
            UnitKind::Kitchens => "Kitchens",
            UnitKind::ParkingSpaces => "Parking spaces",
        }
    }
}

/// Counts per structural unit kind. Kinds never set read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuralUnits(BTreeMap<UnitKind, u32>);

impl StructuralUnits {
    pub fn get(&self, kind: UnitKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: UnitKind, count: u32) {
        if count == 0 {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, count);
        }
    }

    /// Every unit kind with its count, zeros included, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, u32)> + '_ {
        UnitKind::iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Full map of counts as sent to the backend
    pub fn to_map(&self) -> BTreeMap<UnitKind, u32> {
        self.iter().collect()
    }
}

/// A point on the map picked for the property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, EditError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if !lat_ok || !lng_ok {
            return Err(EditError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// Location information for a property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn is_set(&self) -> bool {
        !self.address.trim().is_empty() || self.coordinates.is_some()
    }
}

/// The property being assembled by the creation wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDraft {
    pub category: Option<CategoryId>,
    pub sub_category: Option<SubCategoryId>,
    pub title: String,
    pub description: String,
    pub structural_units: StructuralUnits,
    pub location: Location,
}

impl PropertyDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Select a category. A subcategory not declared under the new category is dropped.
    pub fn select_category(&mut self, catalog: &PropertyCatalog, category: CategoryId) {
        let keep_sub = self
            .sub_category
            .as_ref()
            .is_some_and(|sub| catalog.contains_sub_category(&category, sub));
        if !keep_sub {
            self.sub_category = None;
        }
        self.category = Some(category);
    }

    /// Title length as submitted, surrounding whitespace excluded
    pub fn title_chars(&self) -> usize {
        self.title.trim().chars().count()
    }
}
