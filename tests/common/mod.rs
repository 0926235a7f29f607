//! Shared fixtures for integration tests
//!
//! A small justice-domain backend: three events with knowledge-base
//! candidates, one primitive and its slot templates.

#![allow(dead_code)]

use schema_curator::model::{PrimitiveRecommendation, SlotTemplates};
use schema_curator::{LoadedSchema, MockBackend, QnodeOption, SavedSchema};
use serde_json::json;

pub const ARREST_PRIMITIVE: &str = "Justice.ArrestJailDetain.Unspecified";

pub fn arrest_recommendation() -> PrimitiveRecommendation {
    PrimitiveRecommendation {
        type_subtype: "Justice.ArrestJailDetain".to_string(),
        subsubtypes: vec!["Unspecified".to_string()],
        description: Some("Someone is taken into custody".to_string()),
    }
}

pub fn arrest_slots() -> SlotTemplates {
    SlotTemplates {
        slots: vec!["Jailer".into(), "Detainee".into(), "Place".into()],
        constraints: vec![
            vec!["per".into(), "org".into()],
            vec!["per".into()],
            vec!["fac".into(), "loc".into()],
        ],
    }
}

/// Backend answering every call the justice fixtures make
pub fn justice_backend() -> MockBackend {
    MockBackend::new()
        .with_event_options("arrest", vec![QnodeOption::new("Q1", "arrest").with_definition("detention")])
        .with_event_options("trial", vec![QnodeOption::new("Q2", "trial")])
        .with_event_options("release", vec![QnodeOption::new("Q3", "release")])
        .with_refvar_options("suspect", vec![QnodeOption::new("Q10", "suspect")])
        .with_refvar_options("officer", vec![QnodeOption::new("Q11", "police officer")])
        .with_top_primitives("arrest", vec![arrest_recommendation()])
        .with_top_primitives("trial", vec![arrest_recommendation()])
        .with_top_primitives("release", vec![arrest_recommendation()])
        .with_primitives(vec![arrest_recommendation()])
        .with_slots(ARREST_PRIMITIVE, arrest_slots())
}

pub fn saved_listing(file: &str) -> SavedSchema {
    SavedSchema {
        file: file.to_string(),
        schema_id: file.to_string(),
        schema_name: "Criminal case".to_string(),
        schema_dscpt: "From arrest to verdict".to_string(),
        timestamp: "2021-03-02 10:00:00".to_string(),
        augmentation_flag: true,
    }
}

/// A saved schema of two linked events with a recommendation group
/// anchored on `arrest`
pub fn saved_case() -> LoadedSchema {
    serde_json::from_value(json!({
        "schema_id": "criminal-case",
        "schema_name": "Criminal case",
        "schema_dscpt": "From arrest to verdict",
        "events": [
            {
                "event_text": "arrest",
                "event_primitive": ARREST_PRIMITIVE,
                "id_num": 1,
                "reference": "Q1",
                "args": [{"role": "Detainee", "refvar": "suspect", "constraints": ["per"], "reference": "Q10"}]
            },
            {
                "event_text": "release",
                "event_primitive": ARREST_PRIMITIVE,
                "id_num": 2,
                "args": [{"role": "Detainee", "refvar": "suspect", "constraints": ["per"]}]
            }
        ],
        "order": [["arrest", "release"]],
        "rec_events": [["arrest", "trial", "hearing"]]
    }))
    .expect("fixture schema is valid")
}
