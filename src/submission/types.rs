use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Location, UnitKind};

/// Message shown when the server did not explain a failure
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while creating the property. Please try again.";

/// Message recorded when the draft is not complete
pub const INCOMPLETE_MESSAGE: &str = "incomplete";

/// Broad class of a failed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The draft did not pass validation; nothing was sent
    Incomplete,
    /// Network trouble or a temporarily unavailable server
    Transient,
    /// The server refused the property
    Rejected,
    /// The credential is missing or no longer accepted
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// State of the property creation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(SubmissionFailure),
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }

    pub fn property_id(&self) -> Option<&str> {
        match self {
            SubmissionState::Succeeded(id) => Some(id),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SubmissionFailure> {
        match self {
            SubmissionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// One image attached to the creation request
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub client_id: String,
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Arc<[u8]>,
}

/// Everything sent to the property creation endpoint
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub category: String,
    pub sub_category: Option<String>,
    pub title: String,
    pub description: String,
    pub structural_units: BTreeMap<UnitKind, u32>,
    pub location: Location,
    /// In staging order, cover first
    pub images: Vec<ImagePart>,
}

impl SubmissionPayload {
    /// Text fields of the multipart form, in the order they are sent
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut fields = vec![("category", self.category.clone())];
        if let Some(sub) = &self.sub_category {
            fields.push(("subCategory", sub.clone()));
        }
        fields.push(("title", self.title.clone()));
        fields.push(("description", self.description.clone()));
        fields.push(("structuralUnits", serde_json::to_string(&self.structural_units)?));
        fields.push(("location", serde_json::to_string(&self.location)?));
        if let Some(cover) = self.images.first() {
            fields.push(("coverImage", cover.client_id.clone()));
        }
        Ok(fields)
    }

    pub fn total_image_bytes(&self) -> usize {
        self.images.iter().map(|image| image.data.len()).sum()
    }
}

/// Resource created by a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProperty {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn payload() -> SubmissionPayload {
        let mut units = BTreeMap::new();
        units.insert(UnitKind::Floors, 3);
        units.insert(UnitKind::Gym, 0);
        SubmissionPayload {
            category: "Office".into(),
            sub_category: None,
            title: "Riverside offices".into(),
            description: String::new(),
            structural_units: units,
            location: Location {
                address: "Kungsgatan 1".into(),
                coordinates: Some(Coordinates::new(59.33, 18.06).unwrap()),
            },
            images: vec![ImagePart {
                client_id: "img-1".into(),
                file_name: "front.jpg".into(),
                content_type: "image/jpeg",
                data: Arc::from(vec![1u8, 2, 3]),
            }],
        }
    }

    #[test]
    fn form_fields_serialize_structured_values_as_json() {
        let fields = payload().form_fields().unwrap();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["category", "title", "description", "structuralUnits", "location", "coverImage"]
        );

        let units: serde_json::Value = serde_json::from_str(&fields[3].1).unwrap();
        assert_eq!(units["floors"], 3);
        assert_eq!(units["gym"], 0);

        let location: serde_json::Value = serde_json::from_str(&fields[4].1).unwrap();
        assert_eq!(location["coordinates"]["lat"], 59.33);
        assert_eq!(fields[5].1, "img-1");
    }

    #[test]
    fn subcategory_is_sent_when_present() {
        let mut payload = payload();
        payload.sub_category = Some("Executive Suite".into());
        let fields = payload.form_fields().unwrap();
        assert_eq!(fields[1], ("subCategory", "Executive Suite".to_string()));
        assert_eq!(payload.total_image_bytes(), 3);
    }
}
