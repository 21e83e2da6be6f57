//! Application state

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::agent::{AgentRuntime, ClaudeRuntime, Conversation};
use crate::config::Config;
use crate::core::layout::WorkspaceLayout;
use crate::db::{
    ActivityRepository, AgentMessageRepository, AgentRepository, Database, DocumentRepository,
    ParsedDocumentRepository, WorkspaceRepository,
};
use crate::filings::{EdgarClient, FilingDownloader};
use crate::parser::{DocumentParser, ParseApiClient};
use crate::pipeline::WorkspaceOrchestrator;
use crate::search::ListedIndex;

/// Everything a request handler needs, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub layout: WorkspaceLayout,
    pub workspaces: WorkspaceRepository,
    pub documents: DocumentRepository,
    pub parsed_documents: ParsedDocumentRepository,
    pub activities: ActivityRepository,
    pub agents: AgentRepository,
    pub agent_messages: AgentMessageRepository,
    pub orchestrator: WorkspaceOrchestrator,
    pub conversation: Conversation,
    pub downloader: Arc<dyn FilingDownloader>,
    pub listed: Arc<ListedIndex>,
    /// Bearer secret; authenticated routes reject everything when unset
    pub api_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        db: Database,
        layout: WorkspaceLayout,
        downloader: Arc<dyn FilingDownloader>,
        parser: Option<Arc<dyn DocumentParser>>,
        runtime: Arc<dyn AgentRuntime>,
        listed: ListedIndex,
        api_secret: Option<String>,
    ) -> Self {
        let orchestrator =
            WorkspaceOrchestrator::new(db.clone(), layout.clone(), downloader.clone(), parser);
        let conversation = Conversation::new(
            AgentRepository::new(db.clone()),
            AgentMessageRepository::new(db.clone()),
            runtime,
            layout.clone(),
        );

        Self {
            workspaces: WorkspaceRepository::new(db.clone()),
            documents: DocumentRepository::new(db.clone()),
            parsed_documents: ParsedDocumentRepository::new(db.clone()),
            activities: ActivityRepository::new(db.clone()),
            agents: AgentRepository::new(db.clone()),
            agent_messages: AgentMessageRepository::new(db.clone()),
            orchestrator,
            conversation,
            downloader,
            listed: Arc::new(listed),
            api_secret: api_secret.filter(|s| !s.is_empty()).map(Arc::from),
            layout,
            db,
        }
    }

    /// Wire production services from the config
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::new(&config.resolve_db_path()?)?;

        let data_root = config.resolve_data_root()?;
        std::fs::create_dir_all(&data_root)?;
        // Stored document paths are absolute
        let layout = WorkspaceLayout::new(std::fs::canonicalize(&data_root)?);

        let downloader: Arc<dyn FilingDownloader> =
            Arc::new(EdgarClient::new(&config.edgar.user_agent));

        let parser: Option<Arc<dyn DocumentParser>> = match config.parser_api_key() {
            Some(key) => Some(Arc::new(ParseApiClient::new(&config.parser.url, key))),
            None => {
                warn!("PARSER_API_KEY not set, uploaded documents will not be parsed");
                None
            }
        };

        let runtime: Arc<dyn AgentRuntime> = Arc::new(ClaudeRuntime::resolve(&config.agent.command));
        let listed = ListedIndex::load(&config.resolve_listed_path()?)?;

        if config.api_secret().is_none() {
            warn!("API_SECRET not set, authenticated routes will reject every request");
        }

        info!("Data root: {:?}", layout.data_root());
        Ok(Self::new(
            db,
            layout,
            downloader,
            parser,
            runtime,
            listed,
            config.api_secret().map(String::from),
        ))
    }
}
