//! Claude Code CLI runtime

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::runtime::{AgentChunk, AgentRuntime};

/// Tools the agent may use inside its working directory
const ALLOWED_TOOLS: &str = "Read,Write,Bash";

/// Runs `claude -p` once per prompt, in the agent's working directory
pub struct ClaudeRuntime {
    /// Path to claude CLI binary
    claude_path: String,
}

impl ClaudeRuntime {
    pub fn new(claude_path: impl Into<String>) -> Self {
        Self {
            claude_path: claude_path.into(),
        }
    }

    /// Resolve `command` on PATH, falling back to the bare name
    pub fn resolve(command: &str) -> Self {
        let claude_path = which::which(command)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| command.to_string());
        Self::new(claude_path)
    }

    pub fn claude_path(&self) -> &str {
        &self.claude_path
    }

    fn command(&self, work_dir: &Path, output_format: &str) -> Command {
        let mut cmd = Command::new(&self.claude_path);
        cmd.arg("-p"); // Print mode (non-interactive)
        cmd.arg("--output-format").arg(output_format);
        if output_format == "stream-json" {
            cmd.arg("--verbose");
        }
        cmd.arg("--allowedTools").arg(ALLOWED_TOOLS);
        cmd.arg("--permission-mode").arg("acceptEdits");
        cmd.current_dir(work_dir);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    async fn spawn_with_prompt(
        &self,
        work_dir: &Path,
        output_format: &str,
        prompt: &str,
    ) -> Result<tokio::process::Child> {
        std::fs::create_dir_all(work_dir)
            .context("Failed to create agent working directory")?;

        let mut cmd = self.command(work_dir, output_format);
        debug!("Starting Claude Code run: {:?}", cmd);

        let mut child = cmd.spawn().context("Failed to start Claude Code process")?;

        let mut stdin = child.stdin.take().context("Failed to get stdin")?;
        stdin.write_all(prompt.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        drop(stdin);

        Ok(child)
    }
}

impl Default for ClaudeRuntime {
    fn default() -> Self {
        Self::resolve("claude")
    }
}

/// Text of a `--output-format json` result, or the raw output when not JSON
fn result_text(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json
            .get("result")
            .or_else(|| json.get("content"))
            .or_else(|| json.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or(raw)
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// One `stream-json` line mapped to what the caller should see.
///
/// Returns `(chunks, finished)`.
fn stream_line(line: &str) -> (Vec<AgentChunk>, bool) {
    let Ok(event) = serde_json::from_str::<serde_json::Value>(line) else {
        return (Vec::new(), false);
    };

    match event.get("type").and_then(|t| t.as_str()) {
        Some("assistant") => {
            let chunks = event
                .pointer("/message/content")
                .and_then(|c| c.as_array())
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                        .map(|t| AgentChunk::Text(t.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            (chunks, false)
        }
        Some("result") => {
            let is_error = event.get("is_error").and_then(|e| e.as_bool()).unwrap_or(false);
            if is_error {
                let message = event
                    .get("result")
                    .and_then(|r| r.as_str())
                    .unwrap_or("Agent run failed")
                    .to_string();
                (vec![AgentChunk::Error(message)], true)
            } else {
                (Vec::new(), true)
            }
        }
        _ => (Vec::new(), false),
    }
}

#[async_trait]
impl AgentRuntime for ClaudeRuntime {
    async fn query(&self, prompt: &str, work_dir: &Path) -> Result<String> {
        let child = self.spawn_with_prompt(work_dir, "json", prompt).await?;

        let output = child
            .wait_with_output()
            .await
            .context("Failed to read Claude Code output")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Claude Code exited with {}: {}", output.status, stderr.trim());
        }

        let content = result_text(&String::from_utf8_lossy(&output.stdout));
        debug!(
            "Received response from Claude Code: {}",
            content.chars().take(200).collect::<String>()
        );
        Ok(content)
    }

    async fn stream(&self, prompt: &str, work_dir: &Path) -> Result<mpsc::Receiver<AgentChunk>> {
        let mut child = self.spawn_with_prompt(work_dir, "stream-json", prompt).await?;
        let stdout = child.stdout.take().context("Failed to get stdout")?;
        let work_dir: PathBuf = work_dir.to_path_buf();

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let (chunks, finished) = stream_line(&line);
                        for chunk in chunks {
                            if tx.send(chunk).await.is_err() {
                                return;
                            }
                        }
                        if finished {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed reading Claude Code stream: {}", e);
                        let _ = tx.send(AgentChunk::Error(e.to_string())).await;
                        break;
                    }
                }
            }

            match child.wait().await {
                Ok(status) if !status.success() => {
                    let _ = tx
                        .send(AgentChunk::Error(format!("Claude Code exited with {}", status)))
                        .await;
                }
                Ok(_) => info!("Claude Code run finished in {:?}", work_dir),
                Err(e) => warn!("Failed to reap Claude Code process: {}", e),
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_text_prefers_result_field() {
        assert_eq!(result_text(r#"{"type":"result","result":"hello"}"#), "hello");
        assert_eq!(result_text("plain output"), "plain output");
    }

    #[test]
    fn stream_line_extracts_text_blocks() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Revenue grew"},{"type":"tool_use","name":"Read"}]}}"#;
        let (chunks, finished) = stream_line(line);
        assert_eq!(chunks, vec![AgentChunk::Text("Revenue grew".to_string())]);
        assert!(!finished);
    }

    #[test]
    fn stream_line_stops_on_result() {
        let (chunks, finished) = stream_line(r#"{"type":"result","is_error":false,"result":"x"}"#);
        assert!(chunks.is_empty());
        assert!(finished);

        let (chunks, finished) = stream_line(r#"{"type":"result","is_error":true,"result":"boom"}"#);
        assert_eq!(chunks, vec![AgentChunk::Error("boom".to_string())]);
        assert!(finished);
    }

    #[test]
    fn stream_line_ignores_noise() {
        assert_eq!(stream_line("not json"), (Vec::new(), false));
        assert_eq!(stream_line(r#"{"type":"system"}"#), (Vec::new(), false));
    }
}
