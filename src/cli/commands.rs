//! CLI commands

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::AppState;
use crate::pipeline::{CreateWorkspaceRequest, Upload};

#[derive(Parser)]
#[command(name = "ken-analyst")]
#[command(about = "Workspace backend for SEC filing research", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.ken-analyst/config.yml)
    #[arg(long)]
    config: Option<String>,

    /// Database path, overrides the config file
    #[arg(long)]
    database: Option<String>,

    /// Data root, overrides the config file
    #[arg(long)]
    data_root: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List all workspaces
    Workspaces,

    /// Create a workspace, optionally from a file and/or a ticker's filings
    CreateWorkspace {
        /// Ticker whose 10-Q and 10-K filings are downloaded
        #[arg(long)]
        ticker: Option<String>,

        /// Workspace ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// File or zip archive to add
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a workspace with everything it owns
    DeleteWorkspace {
        /// Workspace ID
        workspace_id: String,
    },

    /// Show a workspace's activity log, newest first
    Activities {
        /// Workspace ID
        workspace_id: String,
    },

    /// Search listed symbols
    Search {
        query: String,

        /// Include ETFs
        #[arg(long)]
        etf: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(data_root) = cli.data_root {
        config.data_root = data_root;
    }

    let state = AppState::from_config(&config)?;

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            tracing::info!("Starting HTTP server on {}:{}", host, port);

            crate::api::serve(state, &host, port).await?;
            Ok(())
        }

        Commands::Workspaces => {
            let workspaces = state.workspaces.list().await?;

            if workspaces.is_empty() {
                println!("No workspaces found");
            } else {
                for workspace in workspaces {
                    println!(
                        "[{}] {} - {} ({})",
                        workspace.id,
                        workspace.name,
                        workspace.ticker,
                        workspace.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
            Ok(())
        }

        Commands::CreateWorkspace { ticker, id, file } => {
            let upload = file.as_deref().map(Upload::from_path).transpose()?;

            let created = state
                .orchestrator
                .create(CreateWorkspaceRequest {
                    workspace_id: id,
                    ticker,
                    upload,
                })
                .await?;

            println!(
                "Created workspace: {} ({}) with {} document(s)",
                created.workspace.name,
                created.workspace.id,
                created.documents.len()
            );
            for doc in created.documents {
                println!("  {} {} {}", doc.id, doc.doc_type.as_str(), doc.file_path);
            }
            Ok(())
        }

        Commands::DeleteWorkspace { workspace_id } => {
            if state.orchestrator.delete(&workspace_id).await? {
                println!("Deleted workspace: {}", workspace_id);
            } else {
                println!("Workspace not found: {}", workspace_id);
            }
            Ok(())
        }

        Commands::Activities { workspace_id } => {
            let activities = state.activities.list(Some(&workspace_id)).await?;

            if activities.is_empty() {
                println!("No activity found");
            } else {
                for activity in activities {
                    println!(
                        "{} [{}] {:>4} {} - {}",
                        activity.created_at.format("%Y-%m-%d %H:%M:%S"),
                        activity.category.as_str(),
                        activity.status,
                        activity.title,
                        activity.message
                    );
                }
            }
            Ok(())
        }

        Commands::Search { query, etf } => {
            let hits = state.listed.search(&query, etf);

            if hits.is_empty() {
                println!("No symbols found");
            } else {
                for hit in hits {
                    println!("{:<8} {}", hit.symbol, hit.name);
                }
            }
            Ok(())
        }
        }
    })
}
