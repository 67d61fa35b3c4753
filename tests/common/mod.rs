#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use property_wizard::models::UnitKind;
use property_wizard::submission::{CreatedProperty, PropertyApi, SubmissionPayload};
use property_wizard::wizard::ImageSelection;
use property_wizard::{PropertyCatalog, StepId, SubmissionError, Wizard};

pub const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn png_bytes() -> Vec<u8> {
    let mut data = PNG_HEADER.to_vec();
    data.extend_from_slice(b"fake pixels");
    data
}

pub fn png(name: &str) -> ImageSelection {
    ImageSelection::Bytes {
        file_name: name.to_string(),
        data: png_bytes(),
    }
}

pub fn new_wizard() -> Wizard {
    Wizard::new(PropertyCatalog::standard(), 1024 * 1024)
}

/// A wizard with every step filled in, sitting on the preview step
pub fn complete_wizard() -> Wizard {
    let mut wizard = new_wizard();
    wizard.select_category("Office".into()).unwrap();
    wizard.go_next().unwrap();
    wizard.select_sub_category("Corporate Headquarters".into()).unwrap();
    wizard.go_next().unwrap();
    wizard.set_title("Nordic HQ").unwrap();
    wizard.go_next().unwrap();
    wizard.set_unit_count(UnitKind::Floors, 12).unwrap();
    wizard.set_unit_count(UnitKind::MeetingRooms, 30).unwrap();
    wizard.go_next().unwrap();
    wizard.set_address("Kungsgatan 1, Stockholm").unwrap();
    wizard.go_next().unwrap();
    wizard.add_images([png("front.png"), png("lobby.png")]).unwrap();
    wizard.go_next().unwrap();
    assert_eq!(wizard.current_step(), StepId::Preview);
    wizard
}

/// In-memory property endpoint that records what it receives
pub struct FakeApi {
    calls: AtomicUsize,
    response: Mutex<Result<CreatedProperty, SubmissionError>>,
    payloads: Mutex<Vec<SubmissionPayload>>,
    tokens: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn succeeding(id: &str) -> Self {
        Self::with_response(Ok(CreatedProperty { id: id.to_string() }))
    }

    pub fn failing(error: SubmissionError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<CreatedProperty, SubmissionError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(response),
            payloads: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_with(&self, response: Result<CreatedProperty, SubmissionError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl PropertyApi for FakeApi {
    async fn create_property(
        &self,
        payload: SubmissionPayload,
        bearer_token: &str,
    ) -> Result<CreatedProperty, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload);
        self.tokens.lock().unwrap().push(bearer_token.to_string());
        self.response.lock().unwrap().clone()
    }

    fn api_name(&self) -> &'static str {
        "fake property API"
    }
}
