use pretty_assertions::assert_eq;
use serde_json::json;
use studio_core::{EditSession, FileStore, RecordStore, SessionError, StoreError, StudioConfig};
use studio_matrix::{Direction, ExplanationField};
use studio_merge::{Decision, Field, ImplementationOutcome};
use studio_matrix::ImplementationMatrix;
use studio_record::Record;
use studio_test_utils::{
    block, legacy_encoded, row, sample_matrix, two_sum_json, CannedGenerator, FlakyStore,
};

fn loaded() -> EditSession {
    EditSession::load(&two_sum_json().to_string(), &StudioConfig::new()).unwrap()
}

#[test]
fn legacy_record_loads_like_structured() {
    let legacy = legacy_encoded(two_sum_json());
    let session = EditSession::load(&legacy.to_string(), &StudioConfig::new()).unwrap();

    assert_eq!(session.record(), loaded().record());
    assert!(session.has_cell("typescript", "starter"));
    assert!(!session.has_cell("python", "starter"));
}

#[test]
fn coverage_lists_missing_languages() {
    let session = loaded();
    let coverage = session.coverage();

    assert_eq!(coverage.len(), 2);
    assert!(coverage[0].is_complete());
    let missing: Vec<_> = coverage[1].missing.iter().map(|l| l.label().to_string()).collect();
    assert_eq!(missing, vec!["Python"]);
}

#[test]
fn structural_edits_broadcast() {
    let mut session = loaded();
    session.add_language("java");
    session.add_approach("Divide and Conquer");
    session.set_explanation("divide-and-conquer", ExplanationField::After, "O(n log n)");
    session.reorder_approach("starter", Direction::Right);

    for row in session.matrix().rows() {
        let block = row.block(&"divide-and-conquer".into()).unwrap();
        assert_eq!(block.explanation_after, "O(n log n)");
    }
    assert!(session.matrix().validate().errors().next().is_none());
}

#[test]
fn smart_fill_protects_curated_fields() {
    let mut session = loaded();
    let report = session
        .import_text(
            &json!([{
                "id": "generated-id",
                "title": "Generated",
                "metadata": {"likes": 99, "overview": "Fresh summary"},
                "implementations": [{"lang": "typescript", "code": [
                    {"codeType": "optimize", "code": "Y"}
                ]}]
            }])
            .to_string(),
        )
        .unwrap();

    let record = session.record();
    assert_eq!(record.id, "two-sum");
    assert_eq!(record.title, "Two Sum");
    assert_eq!(record.metadata.likes, Some(0));
    assert_eq!(record.metadata.overview.as_deref(), Some("Fresh summary"));
    assert_eq!(session.matrix().cell("TypeScript", "optimize").unwrap().code, "Y");
    assert_eq!(session.matrix().cell("TypeScript", "starter").unwrap().code, "Z");

    assert_eq!(report.decision(Field::Id), Some(Decision::KeptExisting));
    assert_eq!(report.decision(Field::Overview), Some(Decision::TookIncoming));
    assert_eq!(report.implementations().outcome, ImplementationOutcome::Merged);
}

#[test]
fn smart_fill_adds_rows_and_overwrites_cells() {
    let mut session = EditSession::new_empty(&StudioConfig::new()).unwrap();
    session.record_mut().implementations = sample_matrix();

    let mut payload = Record::new();
    payload.implementations = ImplementationMatrix::from_rows([
        row("python", [block("optimize", "P2")]),
        row("Java", [block("optimize", "J")]),
    ]);
    let report = session.smart_fill(&payload);

    let summary = report.implementations();
    assert_eq!(summary.outcome, ImplementationOutcome::Merged);
    assert_eq!(summary.overwritten.len(), 1);
    assert_eq!(summary.languages_added.len(), 1);
    assert_eq!(session.matrix().cell("Python", "optimize").unwrap().code, "P2");
    assert_eq!(session.matrix().cell("TypeScript", "starter").unwrap().code, "Z");
    assert!(session.has_cell("Java", "optimize"));
}

#[test]
fn null_cell_fields_load_and_import() {
    let stored = json!({
        "id": "two-sum", "name": "Two Sum", "title": "",
        "implementations": [{"lang": "java", "code": [
            {"codeType": "optimize", "code": "J", "explanationAfter": null}
        ]}]
    });
    let mut session = EditSession::load(&stored.to_string(), &StudioConfig::new()).unwrap();
    assert_eq!(session.matrix().cell("Java", "optimize").unwrap().explanation_after, "");

    session
        .import_text(
            r#"{"title": "Filled", "implementations": [{"lang": "java", "code": [
                {"codeType": "optimize", "code": "K", "explanationBefore": null}
            ]}]}"#,
        )
        .unwrap();
    assert_eq!(session.record().title, "Filled");
    assert_eq!(session.matrix().cell("Java", "optimize").unwrap().code, "K");
}

#[tokio::test]
async fn generated_payload_is_preview_then_fill() {
    let mut session = EditSession::new_empty(&StudioConfig::new()).unwrap();
    let generator = CannedGenerator::returning(two_sum_json());

    let preview = session.generate(&generator, "two sum").await.unwrap();
    assert!(session.matrix().is_empty());

    session.smart_fill(&preview);
    assert_eq!(session.record().title, "Two Sum");
    assert_eq!(session.matrix().len(), 2);
}

#[tokio::test]
async fn unavailable_generator_is_retryable() {
    let session = EditSession::new_empty(&StudioConfig::new()).unwrap();
    let err = session
        .generate(&CannedGenerator::unavailable("503"), "two sum")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Generation(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn failed_save_keeps_record_and_retries() {
    let mut session = EditSession::new_empty(&StudioConfig::new()).unwrap();
    session.smart_fill(&studio_test_utils::two_sum_record());
    let before = session.record().clone();
    let store = FlakyStore::failing(1);

    let err = session.save(&store).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session.record(), &before);
    assert!(!session.is_persisted());

    session.save(&store).await.unwrap();
    assert!(session.is_persisted());
    assert_eq!(store.inner().len(), 1);
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("records"));
    let mut session = EditSession::new_empty(&StudioConfig::new()).unwrap();
    session.smart_fill(&studio_test_utils::two_sum_record());

    session.save(&store).await.unwrap();
    session.record_mut().difficulty = "medium".to_string();
    session.save(&store).await.unwrap();

    let stored = store.get("two-sum").await.unwrap().unwrap();
    assert_eq!(&stored, session.record());
    assert!(store.get("missing").await.unwrap().is_none());

    let err = store.create(session.record()).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn file_store_reads_legacy_files() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = legacy_encoded(two_sum_json());
    tokio::fs::write(dir.path().join("two-sum.json"), legacy.to_string())
        .await
        .unwrap();

    let store = FileStore::new(dir.path());
    let stored = store.get("two-sum").await.unwrap().unwrap();
    assert!(stored.implementations.has_cell("Python", "optimize"));
}

#[tokio::test]
async fn config_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studio.toml");
    tokio::fs::write(
        &path,
        "default_approaches = [\"naive\"]\n[merge.overrides]\ntitle = \"prefer_incoming\"\n",
    )
    .await
    .unwrap();

    let config = StudioConfig::load(&path).await.unwrap();
    let mut session = EditSession::new_empty(&config).unwrap();
    session.add_language("rust");
    assert!(session.has_cell("Rust", "naive"));

    session.record_mut().title = "Old".to_string();
    session.import_text(r#"{"title": "New"}"#).unwrap();
    assert_eq!(session.record().title, "New");
}
