// Shared fakes for pipeline and API tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use ken_analyst::agent::{AgentChunk, AgentRuntime};
use ken_analyst::core::WorkspaceLayout;
use ken_analyst::db::Database;
use ken_analyst::filings::downloader::form_folder;
use ken_analyst::filings::{FilingDownloader, FormType, FULL_SUBMISSION_FILE};
use ken_analyst::parser::DocumentParser;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub struct TestEnv {
    pub db: Database,
    pub layout: WorkspaceLayout,
    pub temp: TempDir,
}

pub fn test_env() -> TestEnv {
    let temp = TempDir::new().unwrap();
    let db = Database::new(temp.path().join("test.db")).unwrap();
    let layout = WorkspaceLayout::new(temp.path().join("data"));
    std::fs::create_dir_all(layout.data_root()).unwrap();
    TestEnv { db, layout, temp }
}

pub fn submission_text(filed: &str, period: &str) -> String {
    format!(
        "<SEC-HEADER>\nACCESSION NUMBER:\t\t0000320193-23-000064\n\
         CONFORMED SUBMISSION TYPE:\t10-Q\n\
         CONFORMED PERIOD OF REPORT:\t{}\n\
         FILED AS OF DATE:\t\t{}\n</SEC-HEADER>\n",
        period, filed
    )
}

/// Writes canned filings; forms listed in `fail` return an error
#[derive(Default)]
pub struct FakeDownloader {
    pub filings: Vec<(FormType, &'static str)>,
    pub fail: Vec<FormType>,
    pub calls: Mutex<Vec<(String, FormType, PathBuf)>>,
}

impl FakeDownloader {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FilingDownloader for FakeDownloader {
    async fn download(
        &self,
        ticker: &str,
        form: FormType,
        _after: NaiveDate,
        dest: &Path,
    ) -> Result<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), form, dest.to_path_buf()));

        if self.fail.contains(&form) {
            anyhow::bail!("EDGAR unavailable for {}", form.as_str());
        }

        let folder = form_folder(dest, ticker, form);
        std::fs::create_dir_all(&folder)?;
        for (f, accession) in &self.filings {
            if *f != form {
                continue;
            }
            let dir = folder.join(accession);
            std::fs::create_dir_all(&dir)?;
            std::fs::write(
                dir.join(FULL_SUBMISSION_FILE),
                submission_text("20230415", "20230331"),
            )?;
        }
        Ok(folder)
    }
}

/// Returns a small JSON body; files whose name contains `bad` fail
#[derive(Default)]
pub struct FakeParser {
    pub calls: AtomicUsize,
}

#[async_trait]
impl DocumentParser for FakeParser {
    async fn parse(&self, path: &Path) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if name.contains("bad") {
            anyhow::bail!("parser rejected {}", name);
        }
        Ok(serde_json::json!({ "markdown": format!("# {}", name), "chunks": [] }))
    }
}

/// Echoes the prompt and records the working directory
#[derive(Default)]
pub struct FakeRuntime {
    pub work_dirs: Mutex<Vec<PathBuf>>,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl AgentRuntime for FakeRuntime {
    async fn query(&self, prompt: &str, work_dir: &Path) -> Result<String> {
        self.work_dirs.lock().unwrap().push(work_dir.to_path_buf());
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Revenue grew 8%.".to_string())
    }

    async fn stream(&self, prompt: &str, work_dir: &Path) -> Result<mpsc::Receiver<AgentChunk>> {
        self.work_dirs.lock().unwrap().push(work_dir.to_path_buf());
        self.prompts.lock().unwrap().push(prompt.to_string());
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            let _ = tx.send(AgentChunk::Text("Revenue ".to_string())).await;
            let _ = tx.send(AgentChunk::Text("grew.".to_string())).await;
        });
        Ok(rx)
    }
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }
    buf.into_inner()
}
