//! Persistence of the workspace.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StoreError;
use crate::model::{Group, WorkTree, Workspace, WorkspaceDocument};

/// Where workspace snapshots are kept. Every save writes the full snapshot.
pub trait DocumentStore {
    fn load_tree(&self) -> Result<WorkTree, StoreError>;
    fn save_tree(&self, tree: &WorkTree) -> Result<(), StoreError>;
    fn load_groups(&self) -> Result<Vec<Group>, StoreError>;
    fn save_groups(&self, groups: &[Group]) -> Result<(), StoreError>;

    fn load_workspace(&self) -> Result<Workspace, StoreError> {
        Ok(Workspace::new(self.load_tree()?, self.load_groups()?))
    }

    fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        self.save_tree(&workspace.tree)?;
        let groups: Vec<Group> = workspace.groups.iter().map(|g| g.as_ref().clone()).collect();
        self.save_groups(&groups)
    }
}

/// One pretty-printed JSON document holding both the tree and the groups.
/// A missing file reads as an empty workspace.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_document(&self) -> Result<WorkspaceDocument, StoreError> {
        if !self.path.exists() {
            return Ok(WorkspaceDocument::default());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write_document(&self, doc: &WorkspaceDocument) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn load_tree(&self) -> Result<WorkTree, StoreError> {
        let doc = self.read_document()?;
        Ok(crate::model::document::decode_tree(&doc.clients)?)
    }

    fn save_tree(&self, tree: &WorkTree) -> Result<(), StoreError> {
        let mut doc = self.read_document()?;
        doc.version = crate::model::document::DOCUMENT_VERSION;
        doc.clients = crate::model::document::encode_tree(tree);
        self.write_document(&doc)
    }

    fn load_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.read_document()?.groups)
    }

    fn save_groups(&self, groups: &[Group]) -> Result<(), StoreError> {
        let mut doc = self.read_document()?;
        doc.groups = groups.to_vec();
        self.write_document(&doc)
    }

    fn load_workspace(&self) -> Result<Workspace, StoreError> {
        let workspace = self.read_document()?.into_workspace()?;
        info!(path = %self.path.display(), "loaded workspace");
        Ok(workspace)
    }

    fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        self.write_document(&WorkspaceDocument::from_workspace(workspace))?;
        info!(path = %self.path.display(), "saved workspace");
        Ok(())
    }
}
