use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::requests::DocumentId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DocumentStoreError {
    #[error("document upload rejected: {0}")]
    UploadRejected(String),
    #[error("document `{id}` could not be deleted: {message}")]
    DeleteFailed { id: String, message: String },
}

/// File-store collaborator for permit attachments. Only the adapters talk
/// to it; the workflow engine itself never touches documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<DocumentId, DocumentStoreError>;
    async fn delete(&self, id: &DocumentId) -> Result<(), DocumentStoreError>;
}

/// In-memory store for tests. Deletions of ids listed as failing return an
/// error without removing anything, which lets tests exercise the adapters'
/// aggregated partial-failure path.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing_deletes: Arc<HashSet<String>>,
}

impl InMemoryDocumentStore {
    pub fn with_failing_deletes(ids: Vec<String>) -> Self {
        Self { files: Arc::default(), failing_deletes: Arc::new(ids.into_iter().collect()) }
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        match self.files.lock() {
            Ok(files) => files.contains_key(&id.0),
            Err(poisoned) => poisoned.into_inner().contains_key(&id.0),
        }
    }

    pub fn stored_count(&self) -> usize {
        match self.files.lock() {
            Ok(files) => files.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn insert(&self, id: String, bytes: Vec<u8>) {
        match self.files.lock() {
            Ok(mut files) => {
                files.insert(id, bytes);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, bytes);
            }
        }
    }

    fn remove(&self, id: &str) {
        match self.files.lock() {
            Ok(mut files) => {
                files.remove(id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(id);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upload(&self, _file_name: &str, bytes: &[u8]) -> Result<DocumentId, DocumentStoreError> {
        let id = Uuid::new_v4().to_string();
        self.insert(id.clone(), bytes.to_vec());
        Ok(DocumentId(id))
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), DocumentStoreError> {
        if self.failing_deletes.contains(&id.0) {
            return Err(DocumentStoreError::DeleteFailed {
                id: id.0.clone(),
                message: "simulated storage failure".to_string(),
            });
        }
        self.remove(&id.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::requests::DocumentId;

    use super::{DocumentStore, InMemoryDocumentStore};

    #[tokio::test]
    async fn upload_then_delete_round_trips() {
        let store = InMemoryDocumentStore::default();

        let id = store.upload("medical-note.pdf", b"pdf-bytes").await.expect("upload");
        assert!(store.contains(&id));

        store.delete(&id).await.expect("delete");
        assert!(!store.contains(&id));
    }

    #[tokio::test]
    async fn failing_ids_error_and_keep_nothing_half_done() {
        let store = InMemoryDocumentStore::with_failing_deletes(vec!["doc-broken".to_string()]);

        let error = store
            .delete(&DocumentId("doc-broken".to_string()))
            .await
            .expect_err("delete should fail");
        assert!(error.to_string().contains("doc-broken"));
    }
}
