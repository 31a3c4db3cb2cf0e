//! Uploaded and indexed document types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A successfully indexed source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFile {
    /// Record ID
    pub id: i64,

    /// Blob name the upload was stored under
    pub original_blob_name: String,

    /// Blob name of the processed artifact
    pub indexed_blob_name: String,

    /// Source file type, e.g. `pdf`
    pub file_type: String,

    /// Index the document was added to
    pub index_type: String,

    /// When indexing finished
    #[serde(default)]
    pub indexed_at: Option<NaiveDateTime>,
}

/// A document in blob storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Blob name
    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,

    /// Last modification time, as reported by storage
    #[serde(default)]
    pub last_modified: Option<String>,

    /// Content type, when known
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Blob storage listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocuments {
    /// Documents found
    #[serde(default)]
    pub documents: Vec<StoredDocument>,

    /// Total count reported by storage
    #[serde(default)]
    pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_file_parses_server_shape() {
        let file: IndexedFile = serde_json::from_str(
            r#"{
                "id": 7,
                "original_blob_name": "guide.pdf",
                "indexed_blob_name": "guide-chunked.json",
                "file_type": "pdf",
                "index_type": "idx-m",
                "indexed_at": "2025-06-30T09:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(file.id, 7);
        assert_eq!(file.file_type, "pdf");
    }

    #[test]
    fn test_listing_tolerates_missing_metadata() {
        let listing: StoredDocuments =
            serde_json::from_str(r#"{"documents": [{"name": "a.pdf"}]}"#).unwrap();
        assert_eq!(listing.documents.len(), 1);
        assert!(listing.documents[0].size.is_none());
    }
}
