//! Multi-file upload form.
//!
//! The form only validates and packages; submission is delegated to the
//! caller, which knows which endpoint the files belong to.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::document::DocumentType;

/// How long a success confirmation stays up before the dialog closes itself.
pub const CONFIRMATION_CLOSE_DELAY: Duration = Duration::from_millis(1_500);

pub const DOCUMENT_TYPE_FIELD: &str = "documentType";

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadValidationError {
    #[error("select at least one file to upload")]
    NoFiles,
    #[error("select a document type")]
    DocumentTypeRequired,
    #[error("document type `{document_type}` is not allowed here")]
    DocumentTypeNotAllowed { document_type: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self { file_name, content_type, bytes }
    }
}

/// Validated multipart body: text fields plus one `documents` part per file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPayload {
    pub fields: BTreeMap<String, String>,
    pub files: Vec<UploadFile>,
}

impl UploadPayload {
    pub const FILE_FIELD: &'static str = "documents";
}

#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    allowed_types: Option<Vec<DocumentType>>,
    selected_type: Option<DocumentType>,
    files: Vec<UploadFile>,
    extra_fields: BTreeMap<String, String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a type selector restricted to `types`; a choice becomes mandatory.
    pub fn with_type_selector(types: Vec<DocumentType>) -> Self {
        Self { allowed_types: Some(types), ..Self::default() }
    }

    /// Fixes the type without showing a selector (e.g. payment photos).
    pub fn with_fixed_type(document_type: DocumentType) -> Self {
        Self { selected_type: Some(document_type), ..Self::default() }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.extra_fields.insert(name.into(), value.to_string());
        self
    }

    pub fn select_type(&mut self, document_type: DocumentType) {
        self.selected_type = Some(document_type);
    }

    pub fn add_file(&mut self, file: UploadFile) {
        self.files.push(file);
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn has_type_selector(&self) -> bool {
        self.allowed_types.is_some()
    }

    pub fn validate(&self) -> Result<(), UploadValidationError> {
        if self.files.is_empty() {
            return Err(UploadValidationError::NoFiles);
        }

        if let Some(allowed) = &self.allowed_types {
            let Some(selected) = &self.selected_type else {
                return Err(UploadValidationError::DocumentTypeRequired);
            };
            if !allowed.is_empty() && !allowed.contains(selected) {
                return Err(UploadValidationError::DocumentTypeNotAllowed {
                    document_type: selected.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn payload(&self) -> Result<UploadPayload, UploadValidationError> {
        self.validate()?;

        let mut fields = self.extra_fields.clone();
        if let Some(document_type) = &self.selected_type {
            fields.insert(DOCUMENT_TYPE_FIELD.to_string(), document_type.to_string());
        }

        Ok(UploadPayload { fields, files: self.files.clone() })
    }
}

pub fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
