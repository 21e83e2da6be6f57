// Tests for workspace creation: uploads, filings, parsing and activity log

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{test_env, zip_bytes, FakeDownloader, FakeParser, TestEnv};
use ken_analyst::db::repositories::activity::{Activity, ActivityCategory};
use ken_analyst::db::repositories::document::DocType;
use ken_analyst::core::UnsafePathComponent;
use ken_analyst::db::repositories::parsed_document::ParsedDocumentFilter;
use ken_analyst::db::repositories::workspace::InvalidWorkspaceId;
use ken_analyst::db::{
    ActivityRepository, DocumentRepository, ParsedDocumentRepository, WorkspaceRepository,
};
use ken_analyst::filings::FormType;
use ken_analyst::parser::DocumentParser;
use ken_analyst::pipeline::{CreateWorkspaceRequest, Upload, WorkspaceOrchestrator};

fn orchestrator(
    env: &TestEnv,
    downloader: Arc<FakeDownloader>,
    parser: Option<Arc<FakeParser>>,
) -> WorkspaceOrchestrator {
    WorkspaceOrchestrator::new(
        env.db.clone(),
        env.layout.clone(),
        downloader,
        parser.map(|p| p as Arc<dyn DocumentParser>),
    )
}

async fn activities(env: &TestEnv, workspace_id: &str) -> Vec<Activity> {
    let mut all = ActivityRepository::new(env.db.clone())
        .list(Some(workspace_id))
        .await
        .unwrap();
    all.reverse();
    all
}

fn statuses(activities: &[Activity]) -> Vec<(ActivityCategory, i32)> {
    activities.iter().map(|a| (a.category, a.status)).collect()
}

#[tokio::test]
async fn test_plain_upload_is_stored_and_parsed() {
    let env = test_env();
    let parser = Arc::new(FakeParser::default());
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), Some(parser.clone()));

    let created = orch
        .create(CreateWorkspaceRequest {
            workspace_id: Some("ws000001".to_string()),
            ticker: None,
            upload: Some(Upload::new("notes.txt", b"Q3 notes".to_vec())),
        })
        .await
        .unwrap();

    assert_eq!(created.workspace.id, "ws000001");
    assert_eq!(created.workspace.ticker, "UNKNOWN");
    assert_eq!(created.documents.len(), 1);

    let doc = &created.documents[0];
    let ws_dir = env.layout.workspace_dir("ws000001").unwrap();
    assert_eq!(doc.doc_type, DocType::Other);
    assert_eq!(doc.file_path, ws_dir.join("notes.txt").to_string_lossy());
    assert!(doc.filing_date.is_none());
    assert_eq!(std::fs::read(ws_dir.join("notes.txt")).unwrap(), b"Q3 notes");

    let json_path = ws_dir.join("notes.json");
    let body: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(body["markdown"], "# notes.txt");

    let parsed = ParsedDocumentRepository::new(env.db.clone())
        .list(ParsedDocumentFilter {
            documents_id: Some(&doc.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].status);
    assert_eq!(parsed[0].filepath, json_path.to_string_lossy());

    let log = activities(&env, "ws000001").await;
    assert_eq!(
        statuses(&log),
        vec![
            (ActivityCategory::Main, 102),
            (ActivityCategory::Sub, 102),
            (ActivityCategory::Sub, 200),
            (ActivityCategory::Main, 201),
        ]
    );
    assert!(!ws_dir.join("temp").exists());
    assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zip_upload_flattens_with_collision_suffixes() {
    let env = test_env();
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), None);

    let bytes = zip_bytes(&[
        ("2023/q1/report.txt", b"q1"),
        ("2023/q2/report.txt", b"q2"),
        ("summary.csv", b"a,b"),
    ]);
    let created = orch
        .create(CreateWorkspaceRequest {
            upload: Some(Upload::new("reports.zip", bytes)),
            ..Default::default()
        })
        .await
        .unwrap();

    let ws_dir = env.layout.workspace_dir(&created.workspace.id).unwrap();
    let names: Vec<_> = created
        .documents
        .iter()
        .map(|d| {
            std::path::Path::new(&d.file_path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    assert_eq!(names, vec!["summary.csv", "report.txt", "report_1.txt"]);
    assert_eq!(std::fs::read(ws_dir.join("report.txt")).unwrap(), b"q1");
    assert_eq!(std::fs::read(ws_dir.join("report_1.txt")).unwrap(), b"q2");
    assert!(!ws_dir.join("reports.zip").exists());
    assert!(!ws_dir.join("temp").exists());
}

#[tokio::test]
async fn test_invalid_zip_aborts_but_keeps_workspace() {
    let env = test_env();
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), None);

    let err = orch
        .create(CreateWorkspaceRequest {
            workspace_id: Some("broken01".to_string()),
            upload: Some(Upload::new("broken.zip", b"not a zip".to_vec())),
            ..Default::default()
        })
        .await;
    assert!(err.is_err());

    let workspaces = WorkspaceRepository::new(env.db.clone());
    assert!(workspaces.get("broken01").await.unwrap().is_some());
    assert!(!env.layout.workspace_dir("broken01").unwrap().join("temp").exists());
}

#[tokio::test]
async fn test_ticker_downloads_quarterly_then_annual() {
    let env = test_env();
    let downloader = Arc::new(FakeDownloader {
        filings: vec![
            (FormType::TenQ, "0000320193-23-000064"),
            (FormType::TenK, "0000320193-22-000108"),
        ],
        ..Default::default()
    });
    let orch = orchestrator(&env, downloader.clone(), None);

    let created = orch
        .create(CreateWorkspaceRequest {
            ticker: Some("aapl".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.workspace.ticker, "aapl");
    assert_eq!(created.documents.len(), 2);

    let q = &created.documents[0];
    assert_eq!(q.doc_type, DocType::TenQ);
    assert_eq!(q.doc_id.as_deref(), Some("0000320193-23-000064"));
    assert_eq!(q.filing_date.as_deref(), Some("2023/04/15"));
    assert_eq!(q.reporting_date.as_deref(), Some("2023/03/31"));
    let ws_dir = env.layout.workspace_dir(&created.workspace.id).unwrap();
    assert_eq!(
        q.file_path,
        ws_dir
            .join("10-Q_0000320193-23-000064_full-submission.txt")
            .to_string_lossy()
    );
    assert!(ws_dir
        .join("10-Q_0000320193-23-000064_full-submission.txt")
        .is_file());

    let k = &created.documents[1];
    assert_eq!(k.doc_type, DocType::TenK);
    assert_eq!(k.doc_id.as_deref(), Some("0000320193-22-000108"));

    let calls = downloader.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "AAPL");
    assert_eq!(calls[0].1, FormType::TenQ);
    assert_eq!(calls[1].1, FormType::TenK);
    assert!(!env.layout.filing_scratch_dir("AAPL").unwrap().exists());

    let filing_activities = activities(&env, &created.workspace.id)
        .await
        .into_iter()
        .filter(|a| a.category == ActivityCategory::Sub && a.status == 200)
        .count();
    assert_eq!(filing_activities, 2);
}

#[tokio::test]
async fn test_failed_form_type_does_not_block_the_other() {
    let env = test_env();
    let downloader = Arc::new(FakeDownloader {
        filings: vec![(FormType::TenK, "0000320193-22-000108")],
        fail: vec![FormType::TenQ],
        ..Default::default()
    });
    let orch = orchestrator(&env, downloader.clone(), None);

    let created = orch
        .create(CreateWorkspaceRequest {
            ticker: Some("AAPL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(downloader.call_count(), 2);
    assert_eq!(created.documents.len(), 1);
    assert_eq!(created.documents[0].doc_type, DocType::TenK);

    let log = activities(&env, &created.workspace.id).await;
    let failure = log.iter().find(|a| a.status == 500).unwrap();
    assert_eq!(failure.category, ActivityCategory::Sub);
    assert!(failure.title.contains("10-Q"));
    assert!(failure.message.contains("EDGAR unavailable"));
    assert_eq!(log.last().unwrap().status, 201);
}

#[tokio::test]
async fn test_parser_failure_is_isolated() {
    let env = test_env();
    let parser = Arc::new(FakeParser::default());
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), Some(parser.clone()));

    let bytes = zip_bytes(&[("bad.txt", b"x"), ("good.txt", b"y")]);
    let created = orch
        .create(CreateWorkspaceRequest {
            upload: Some(Upload::new("docs.zip", bytes)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.documents.len(), 2);
    assert_eq!(parser.calls.load(Ordering::SeqCst), 2);

    let ws = &created.workspace.id;
    let parsed = ParsedDocumentRepository::new(env.db.clone())
        .list(ParsedDocumentFilter {
            workspace_id: Some(ws),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].filepath.ends_with("good.json"));

    let docs = DocumentRepository::new(env.db.clone())
        .list(Some(ws))
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);

    let log = activities(&env, ws).await;
    assert_eq!(log.iter().filter(|a| a.status == 500).count(), 1);
    assert_eq!(log.iter().filter(|a| a.title == "Parsing completed").count(), 1);
}

#[tokio::test]
async fn test_missing_parser_skips_parsing_silently() {
    let env = test_env();
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), None);

    let created = orch
        .create(CreateWorkspaceRequest {
            upload: Some(Upload::new("notes.txt", b"n".to_vec())),
            ..Default::default()
        })
        .await
        .unwrap();

    let log = activities(&env, &created.workspace.id).await;
    assert_eq!(
        statuses(&log),
        vec![(ActivityCategory::Main, 102), (ActivityCategory::Main, 201)]
    );
    assert!(!env
        .layout
        .workspace_dir(&created.workspace.id)
        .unwrap()
        .join("notes.json")
        .exists());
}

#[tokio::test]
async fn test_duplicate_workspace_fails_before_any_intake() {
    let env = test_env();
    let downloader = Arc::new(FakeDownloader::default());
    let orch = orchestrator(&env, downloader.clone(), None);

    orch.create(CreateWorkspaceRequest {
        workspace_id: Some("dupe0001".to_string()),
        ..Default::default()
    })
    .await
    .unwrap();

    let result = orch
        .create(CreateWorkspaceRequest {
            workspace_id: Some("dupe0001".to_string()),
            ticker: Some("AAPL".to_string()),
            ..Default::default()
        })
        .await;

    assert!(result.is_err());
    assert_eq!(downloader.call_count(), 0);
    assert_eq!(
        WorkspaceRepository::new(env.db.clone()).list().await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_delete_removes_rows_and_folder() {
    let env = test_env();
    let orch = orchestrator(&env, Arc::new(FakeDownloader::default()), None);

    let created = orch
        .create(CreateWorkspaceRequest {
            upload: Some(Upload::new("notes.txt", b"n".to_vec())),
            ..Default::default()
        })
        .await
        .unwrap();
    let ws = created.workspace.id;
    assert!(env.layout.workspace_dir(&ws).unwrap().is_dir());

    assert!(orch.delete(&ws).await.unwrap());
    assert!(!env.layout.workspace_dir(&ws).unwrap().exists());
    assert!(DocumentRepository::new(env.db.clone())
        .list(Some(&ws))
        .await
        .unwrap()
        .is_empty());
    assert!(!orch.delete(&ws).await.unwrap());
}

#[tokio::test]
async fn test_documents_before_a_failed_filing_are_kept_and_parsed() {
    let env = test_env();
    let parser = Arc::new(FakeParser::default());
    let downloader = Arc::new(FakeDownloader {
        filings: vec![
            (FormType::TenQ, "0000320193-23-000001"),
            (FormType::TenQ, "0000320193-23-000002"),
            (FormType::TenK, "0000320193-22-000108"),
        ],
        ..Default::default()
    });
    let orch = orchestrator(&env, downloader, Some(parser.clone()));

    // A directory in the way makes the second quarterly copy fail
    let ws_dir = env.layout.create_workspace_dir("partial1").unwrap();
    std::fs::create_dir_all(ws_dir.join("10-Q_0000320193-23-000002_full-submission.txt")).unwrap();

    let created = orch
        .create(CreateWorkspaceRequest {
            workspace_id: Some("partial1".to_string()),
            ticker: Some("AAPL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let doc_ids: Vec<_> = created
        .documents
        .iter()
        .map(|d| d.doc_id.clone().unwrap())
        .collect();
    assert_eq!(doc_ids, vec!["0000320193-23-000001", "0000320193-22-000108"]);
    assert_eq!(parser.calls.load(Ordering::SeqCst), 2);

    let stored = DocumentRepository::new(env.db.clone())
        .list(Some("partial1"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);

    let log = activities(&env, "partial1").await;
    let failed: Vec<_> = log.iter().filter(|a| a.status == 500).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].title, "10-Q download failed");
}

#[tokio::test]
async fn test_workspace_ids_cannot_leave_the_data_root() {
    let env = test_env();
    let downloader = Arc::new(FakeDownloader::default());
    let orch = orchestrator(&env, downloader.clone(), None);

    let victim = env.temp.path().join("victim");
    std::fs::create_dir_all(&victim).unwrap();
    std::fs::write(victim.join("precious.txt"), b"keep").unwrap();

    let err = orch
        .create(CreateWorkspaceRequest {
            workspace_id: Some("../victim".to_string()),
            ticker: Some("AAPL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<InvalidWorkspaceId>().is_some());
    assert_eq!(downloader.call_count(), 0);

    for id in ["../victim", ".."] {
        let err = orch.delete(id).await.unwrap_err();
        assert!(err.downcast_ref::<UnsafePathComponent>().is_some());
    }
    assert!(victim.join("precious.txt").exists());
    assert!(env.layout.data_root().exists());
    assert!(WorkspaceRepository::new(env.db.clone())
        .list()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_ticker_with_separators_is_refused_before_creation() {
    let env = test_env();
    let downloader = Arc::new(FakeDownloader::default());
    let orch = orchestrator(&env, downloader.clone(), None);

    let err = orch
        .create(CreateWorkspaceRequest {
            ticker: Some("../../etc".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<UnsafePathComponent>().is_some());
    assert_eq!(downloader.call_count(), 0);
    assert!(WorkspaceRepository::new(env.db.clone())
        .list()
        .await
        .unwrap()
        .is_empty());
}
