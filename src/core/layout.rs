//! On-disk layout of workspace folders

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// A caller-supplied name that would not stay one directory below its parent.
#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not a valid folder name")]
pub struct UnsafePathComponent(pub String);

/// Accept `value` only as a single plain path segment.
pub fn path_component(value: &str) -> Result<&str> {
    let plain = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(&['/', '\\', '\0'][..]);
    if !plain {
        return Err(UnsafePathComponent(value.to_string()).into());
    }
    Ok(value)
}

/// Root directory holding one flat folder per workspace id.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    data_root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// `{data_root}/{workspace_id}`
    pub fn workspace_dir(&self, workspace_id: &str) -> Result<PathBuf> {
        Ok(self.data_root.join(path_component(workspace_id)?))
    }

    /// Working directory handed to the agent runtime for one chat session
    pub fn agent_dir(&self, workspace_id: &str, agent_id: &str) -> Result<PathBuf> {
        Ok(self
            .workspace_dir(workspace_id)?
            .join("ai_agents")
            .join(path_component(agent_id)?))
    }

    /// Scratch area the filing downloader writes into for one ticker
    pub fn filing_scratch_dir(&self, ticker: &str) -> Result<PathBuf> {
        Ok(self
            .data_root
            .join(format!("temp_{}", path_component(ticker)?)))
    }

    pub fn create_workspace_dir(&self, workspace_id: &str) -> Result<PathBuf> {
        let dir = self.workspace_dir(workspace_id)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create workspace folder {:?}", dir))?;
        debug!("Created workspace folder {:?}", dir);
        Ok(dir)
    }

    pub fn remove_workspace_dir(&self, workspace_id: &str) -> Result<()> {
        let dir = self.workspace_dir(workspace_id)?;
        if dir.exists() {
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove workspace folder {:?}", dir))?;
            debug!("Removed workspace folder {:?}", dir);
        }
        Ok(())
    }
}

/// Directory removed when dropped, on every exit path.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch directory {:?}", path))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::warn!("Failed to clean up scratch directory {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scratch");
        {
            let scratch = ScratchDir::create(&path).unwrap();
            std::fs::write(scratch.path().join("file.txt"), b"x").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn workspace_paths_live_under_the_data_root() {
        let layout = WorkspaceLayout::new("/data");
        assert_eq!(layout.workspace_dir("abcd1234").unwrap(), PathBuf::from("/data/abcd1234"));
        assert_eq!(
            layout.agent_dir("abcd1234", "agent").unwrap(),
            PathBuf::from("/data/abcd1234/ai_agents/agent")
        );
        assert_eq!(
            layout.filing_scratch_dir("BRK.B").unwrap(),
            PathBuf::from("/data/temp_BRK.B")
        );
    }

    #[test]
    fn names_that_leave_the_data_root_are_refused() {
        let layout = WorkspaceLayout::new("/data");
        for bad in ["", ".", "..", "../victim", "a/b", "a\\b"] {
            let err = layout.workspace_dir(bad).unwrap_err();
            assert!(err.downcast_ref::<UnsafePathComponent>().is_some(), "{:?}", bad);
        }
        assert!(layout.agent_dir("abcd1234", "..").is_err());
        assert!(layout.filing_scratch_dir("../../etc").is_err());
    }

    #[test]
    fn refused_removal_leaves_siblings_alone() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("data");
        let victim = temp.path().join("victim");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&victim).unwrap();
        std::fs::write(victim.join("precious.txt"), b"keep").unwrap();

        let layout = WorkspaceLayout::new(&root);
        assert!(layout.remove_workspace_dir("../victim").is_err());
        assert!(layout.remove_workspace_dir("..").is_err());
        assert!(victim.join("precious.txt").exists());
        assert!(root.exists());
    }
}
