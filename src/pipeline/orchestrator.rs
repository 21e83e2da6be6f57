//! Workspace creation: folder, uploads, filings, parsing and activity log

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use super::files::{intake_upload, Upload};
use super::filings::intake_filings;
use super::parse::parse_documents;
use super::policy::StagePolicies;
use super::status;
use crate::core::layout::{path_component, ScratchDir, WorkspaceLayout};
use crate::db::repositories::activity::{ActivityRepository, NewActivity};
use crate::db::repositories::document::{Document, DocumentRepository};
use crate::db::repositories::parsed_document::ParsedDocumentRepository;
use crate::db::repositories::workspace::{NewWorkspace, Workspace, WorkspaceRepository};
use crate::db::Database;
use crate::filings::{FilingDownloader, FormType};
use crate::parser::DocumentParser;

/// Ticker stored when none is supplied
pub const UNKNOWN_TICKER: &str = "UNKNOWN";

/// Form types fetched for a new workspace, in order
const WORKSPACE_FORMS: [FormType; 2] = [FormType::TenQ, FormType::TenK];

#[derive(Debug, Clone, Default)]
pub struct CreateWorkspaceRequest {
    pub workspace_id: Option<String>,
    pub ticker: Option<String>,
    pub upload: Option<Upload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedWorkspace {
    pub workspace: Workspace,
    pub documents: Vec<Document>,
}

#[derive(Clone)]
pub struct WorkspaceOrchestrator {
    workspaces: WorkspaceRepository,
    documents: DocumentRepository,
    parsed: ParsedDocumentRepository,
    activities: ActivityRepository,
    layout: WorkspaceLayout,
    downloader: Arc<dyn FilingDownloader>,
    parser: Option<Arc<dyn DocumentParser>>,
    policies: StagePolicies,
}

impl WorkspaceOrchestrator {
    pub fn new(
        db: Database,
        layout: WorkspaceLayout,
        downloader: Arc<dyn FilingDownloader>,
        parser: Option<Arc<dyn DocumentParser>>,
    ) -> Self {
        Self {
            workspaces: WorkspaceRepository::new(db.clone()),
            documents: DocumentRepository::new(db.clone()),
            parsed: ParsedDocumentRepository::new(db.clone()),
            activities: ActivityRepository::new(db),
            layout,
            downloader,
            parser,
            policies: StagePolicies::default(),
        }
    }

    pub fn with_policies(mut self, policies: StagePolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Create a workspace and run every intake stage.
    ///
    /// Once the workspace row exists it is kept, even if a later stage fails.
    pub async fn create(&self, request: CreateWorkspaceRequest) -> Result<CreatedWorkspace> {
        let ticker = request
            .ticker
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(ticker) = &ticker {
            path_component(ticker)?;
        }

        let workspace = self
            .workspaces
            .create(NewWorkspace {
                id: request.workspace_id,
                name: None,
                ticker: ticker.clone().unwrap_or_else(|| UNKNOWN_TICKER.to_string()),
            })
            .await?;
        let ws = workspace.id.as_str();
        info!("Creating workspace {} ({})", ws, workspace.name);

        self.activities
            .create(NewActivity::main(
                ws,
                status::STARTED,
                "Creating workspace",
                format!("Setting up workspace '{}'", workspace.name),
            ))
            .await?;

        let workspace_dir = self.layout.create_workspace_dir(ws)?;
        let mut documents = Vec::new();

        if let Some(upload) = &request.upload {
            match intake_upload(&self.documents, ws, &workspace_dir, upload).await {
                Ok(docs) => documents.extend(docs),
                Err(e) => {
                    self.policies
                        .files
                        .handle(&self.activities, ws, "File upload failed", e)
                        .await?
                }
            }
        }

        if let Some(ticker) = ticker.map(|t| t.to_uppercase()) {
            let ticker = ticker.as_str();
            let scratch = ScratchDir::create(self.layout.filing_scratch_dir(ticker)?)?;
            for form in WORKSPACE_FORMS {
                let result = intake_filings(
                    self.downloader.as_ref(),
                    &self.documents,
                    &self.activities,
                    ws,
                    &workspace_dir,
                    ticker,
                    form,
                    scratch.path(),
                    &mut documents,
                )
                .await;
                if let Err(e) = result {
                    warn!("{} intake failed for {}: {:#}", form.as_str(), ticker, e);
                    self.policies
                        .filings
                        .handle(
                            &self.activities,
                            ws,
                            &format!("{} download failed", form.as_str()),
                            e,
                        )
                        .await?
                }
            }
        }

        parse_documents(
            self.parser.as_deref(),
            &self.parsed,
            &self.activities,
            self.policies.parsing,
            ws,
            &documents,
        )
        .await?;

        self.activities
            .create(NewActivity::main(
                ws,
                status::CREATED,
                "Workspace created",
                format!("{} document(s) added", documents.len()),
            ))
            .await?;

        info!("Workspace {} created with {} document(s)", ws, documents.len());
        Ok(CreatedWorkspace {
            workspace,
            documents,
        })
    }

    /// Delete a workspace, its owned rows and its folder
    pub async fn delete(&self, workspace_id: &str) -> Result<bool> {
        self.layout.workspace_dir(workspace_id)?;
        let deleted = self.workspaces.delete(workspace_id).await?;
        if deleted {
            self.layout.remove_workspace_dir(workspace_id)?;
            info!("Deleted workspace {}", workspace_id);
        }
        Ok(deleted)
    }
}
