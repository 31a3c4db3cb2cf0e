//! Document upload, blob storage listing and indexed-file endpoints

use std::path::Path;

use docent_core::types::{AckResponse, IndexedFile, StoredDocuments};
use docent_core::{DocentError, Result};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

fn blob_delete_path(blob_name: &str) -> String {
    format!(
        "/api/blob-storage/delete/{}",
        urlencoding::encode(blob_name)
    )
}

impl ApiClient {
    /// Upload a document for indexing
    ///
    /// The server decides by extension which formats it accepts and answers
    /// 400 for unsupported ones.
    pub async fn upload_document(&self, path: &Path, index_type: &str) -> Result<AckResponse> {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                return Err(DocentError::validation(format!(
                    "upload path has no file name: {}",
                    path.display()
                )))
            }
        };
        let bytes = tokio::fs::read(path).await?;
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("index_type", index_type.to_string());
        self.send_json(self.client.post(self.url("/index")).multipart(form))
            .await
    }

    /// List blobs currently held in document storage
    pub async fn stored_documents(&self) -> Result<StoredDocuments> {
        self.send_json(self.client.get(self.url("/api/blob-storage/list")))
            .await
    }

    /// Delete a stored blob by name
    pub async fn delete_document(&self, blob_name: &str) -> Result<AckResponse> {
        self.send_json(self.client.delete(self.url(&blob_delete_path(blob_name))))
            .await
    }

    /// Files that have been indexed, with their source blobs
    pub async fn indexed_files(&self) -> Result<Vec<IndexedFile>> {
        self.send_json(self.client.get(self.url("/indexed_files")))
            .await
    }
}
