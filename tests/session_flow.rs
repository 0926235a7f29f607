//! End-to-end curation flows against the mock backend

mod common;

use common::{justice_backend, saved_case, saved_listing, ARREST_PRIMITIVE};
use schema_curator::{
    CurationError, Curator, EdgeOrder, MockBackend, SchemaDetails, SelectorKind, SlotEdit, SubmitError,
};
use std::sync::Arc;

/// Add `texts` and give each the top recommended primitive
async fn draft(curator: &mut Curator<MockBackend>, texts: &[&str]) {
    for text in texts {
        curator.add_event(text).await.unwrap();
        let recommended = curator.recommend_primitives(text).await.unwrap();
        let primitive = recommended[0].default_primitive().unwrap();
        curator.session_mut().set_primitive(text, primitive).unwrap();
    }
}

#[tokio::test]
async fn author_and_submit_a_schema() {
    let mut curator = Curator::new(Arc::new(justice_backend()));
    curator
        .session_mut()
        .update_schema_details(SchemaDetails::new("criminal-case", "Criminal case", "From arrest to verdict"));
    draft(&mut curator, &["arrest", "trial", "release"]).await;
    assert_eq!(curator.backend().event_lookups(), 3);
    curator.session_mut().finalize().unwrap();

    // the suspect is the detainee of the arrest and the release
    let templates = curator.slot_templates("arrest").await.unwrap();
    for text in ["arrest", "release"] {
        let session = curator.session_mut();
        session.set_checked(text, true).unwrap();
        session.stage_arg(text, "Detainee", &templates).unwrap();
    }
    let constraints = curator.session().common_constraints();
    assert_eq!(constraints, vec!["per".to_string()]);
    curator.add_arg("suspect", constraints).await.unwrap();
    assert_eq!(curator.backend().refvar_lookups(), 1);
    for text in ["arrest", "release"] {
        curator.session_mut().set_checked(text, false).unwrap();
    }

    // arrest comes before both other events
    let session = curator.session_mut();
    session.set_checked("trial", true).unwrap();
    session.set_checked("release", true).unwrap();
    let ids = session.add_edges(1, EdgeOrder::Succeed).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0].as_str(), "E1-E2");
    assert!(session.checked_events().next().is_none());

    session.select_qnode(SelectorKind::Event, "arrest", Some("Q1")).unwrap();
    session.select_qnode(SelectorKind::Refvar, "suspect", Some("Q10")).unwrap();
    session.commit_selections(SelectorKind::Event);
    session.commit_selections(SelectorKind::Refvar);
    assert!(session.audit().is_empty());

    let output = curator.submit(true).await.unwrap();
    assert_eq!(output.fname, "criminal-case");

    let submissions = curator.backend().submissions();
    assert_eq!(submissions.len(), 1);
    let body = &submissions[0];
    assert_eq!(body.links.len(), 2);
    assert_eq!(body.events[0].reference.as_deref(), Some("Q1"));
    assert_eq!(body.events[0].args[0].reference.as_deref(), Some("Q10"));
    assert_eq!(body.events[2].args[0].refvar.as_deref(), Some("suspect"));
    assert_eq!(body.events[1].reference, None);
    assert_eq!(body.tracking.len(), 3);

    // reset after a successful submit
    assert!(curator.session().events().is_empty());
    assert!(curator.session().tracking().is_empty());
}

#[tokio::test]
async fn invalid_schema_never_reaches_the_backend() {
    let mut curator = Curator::new(Arc::new(justice_backend()));
    draft(&mut curator, &["arrest"]).await;
    curator.add_event("trial").await.unwrap();

    let err = curator.submit(true).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(CurationError::MissingSchemaDetails)));

    curator
        .session_mut()
        .update_schema_details(SchemaDetails::new("case", "Case", "A case"));
    let err = curator.submit(true).await.unwrap_err();
    assert_eq!(err.to_string(), "All events must have a corresponding event primitive.");
    assert_eq!(curator.backend().saves(), 0);
    assert_eq!(curator.session().events().len(), 2);
}

#[tokio::test]
async fn rejected_submission_keeps_the_session() {
    let backend = justice_backend().with_save_failure(400, r#"{"fname": "err", "output": "cycle in graph"}"#);
    let mut curator = Curator::new(Arc::new(backend));
    curator
        .session_mut()
        .update_schema_details(SchemaDetails::new("case", "Case", "A case"));
    draft(&mut curator, &["arrest", "release"]).await;
    curator.session_mut().add_edge("arrest", "release").unwrap();
    curator.session_mut().add_edge("release", "arrest").unwrap();

    let err = curator.submit(true).await.unwrap_err();
    assert!(matches!(err, SubmitError::CycleInGraph));
    assert_eq!(curator.backend().saves(), 1);
    assert_eq!(curator.session().events().len(), 2);
    assert_eq!(curator.session().graph().edge_count(), 2);
}

#[tokio::test]
async fn deleting_events_prunes_what_they_referenced() {
    let mut curator = Curator::new(Arc::new(justice_backend()));
    draft(&mut curator, &["arrest", "release"]).await;
    curator.session_mut().add_edge("arrest", "release").unwrap();

    let templates = curator.slot_templates("arrest").await.unwrap();
    let session = curator.session_mut();
    session.set_checked("arrest", true).unwrap();
    session.stage_arg("arrest", "Jailer", &templates).unwrap();
    curator.add_arg("officer", vec!["per".into()]).await.unwrap();
    curator.session_mut().set_checked("arrest", false).unwrap();
    assert!(curator.session().selectors().refvars.contains("officer"));

    let removed = curator.session_mut().delete_event("arrest").unwrap();
    assert_eq!(removed.event_text, "arrest");
    let session = curator.session();
    assert_eq!(session.graph().edge_count(), 0);
    assert!(!session.selectors().events.contains("arrest"));
    assert!(!session.selectors().refvars.contains("officer"));
    assert!(session.audit().is_empty());

    // sequence numbers are never reused
    curator.add_event("trial").await.unwrap();
    assert_eq!(curator.session().event("trial").unwrap().id_num, 3);
}

#[tokio::test]
async fn renamed_slot_refvar_moves_its_selector() {
    let mut curator = Curator::new(Arc::new(justice_backend()));
    draft(&mut curator, &["arrest"]).await;
    let templates = curator.slot_templates("arrest").await.unwrap();
    let session = curator.session_mut();
    session.set_checked("arrest", true).unwrap();
    session.stage_arg("arrest", "Detainee", &templates).unwrap();
    curator.add_arg("officer", vec![]).await.unwrap();

    curator
        .save_slot("arrest", "Detainee", Some("officer"), SlotEdit::new("Detainee", "suspect", vec!["per".into()]))
        .await
        .unwrap();
    let session = curator.session();
    assert!(!session.selectors().refvars.contains("officer"));
    assert!(session.selectors().refvars.get("suspect").unwrap().has_options());
    assert_eq!(session.event("arrest").unwrap().args[0].constraints, vec!["per".to_string()]);
    assert_eq!(curator.backend().refvar_lookups(), 2);
}

#[tokio::test]
async fn load_saved_schema_and_accept_recommendation() {
    let backend = justice_backend().with_saved_schema(saved_listing("criminal-case"), saved_case());
    let mut curator = Curator::new(Arc::new(backend));

    let listed = curator.saved_schemas("verdict").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(curator.saved_schemas("civil").await.unwrap().is_empty());

    curator.load_saved_schema("criminal-case").await.unwrap();
    let session = curator.session();
    assert_eq!(session.events().len(), 2);
    assert_eq!(session.graph().edge_count(), 1);
    assert_eq!(session.details().schema_id.as_deref(), Some("criminal-case"));
    // stored references survive the fetch of their candidates
    assert_eq!(session.selectors().events.get("arrest").unwrap().qnode.as_deref(), Some("Q1"));
    assert_eq!(session.selectors().refvars.get("suspect").unwrap().qnode.as_deref(), Some("Q10"));

    let rows = session.recommendation_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].after, "E1 - arrest");

    curator
        .add_recommended_event("trial", ARREST_PRIMITIVE.parse().unwrap(), true)
        .await
        .unwrap();
    let session = curator.session();
    let trial = session.event("trial").unwrap();
    assert_eq!(trial.id_num, 3);
    assert!(!trial.required);
    assert!(session.graph().edge_exists("arrest", "trial"));
    assert_eq!(session.recommendation_rows().len(), 1);
    assert!(session.selectors().events.contains("trial"));
}

#[tokio::test]
async fn unreachable_backend_leaves_edits_intact() {
    let mut curator = Curator::new(Arc::new(MockBackend::unavailable()));
    curator.add_event("arrest").await.unwrap();
    curator.rename_event("arrest", "detention").await.unwrap();

    let session = curator.session();
    assert!(session.event("detention").is_some());
    assert!(session.selectors().events.is_empty());
    assert!(curator.recommend_primitives("detention").await.is_err());
}
