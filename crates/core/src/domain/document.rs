use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{DocumentId, MilestoneId, PaymentRequestId, ProjectId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Invoice,
    PhotoPayment,
    PhotoMilestone,
    InspectionReport,
    Contract,
    Other(String),
}

impl DocumentType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Invoice => "invoice",
            Self::PhotoPayment => "photo_payment",
            Self::PhotoMilestone => "photo_milestone",
            Self::InspectionReport => "inspection_report",
            Self::Contract => "contract",
            Self::Other(tag) => tag,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "invoice" => Self::Invoice,
            "photo_payment" => Self::PhotoPayment,
            "photo_milestone" => Self::PhotoMilestone,
            "inspection_report" => Self::InspectionReport,
            "contract" => Self::Contract,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Self::PhotoPayment | Self::PhotoMilestone)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: DocumentId,
    #[serde(default)]
    pub request_id: Option<PaymentRequestId>,
    #[serde(default)]
    pub milestone_id: Option<MilestoneId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub document_type: DocumentType,
    pub document_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_project_cover: bool,
}

impl Document {
    /// Resolves the stored path against the file server base URL.
    pub fn resolve_url(&self, file_server_base_url: &str) -> String {
        join_url(file_server_base_url, &self.document_path)
    }
}

/// One entry of a bulk reorder call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOrder {
    pub document_id: DocumentId,
    pub display_order: i32,
}

/// Display orders for `documents` in their current sequence.
pub fn display_orders(documents: &[Document]) -> Vec<DisplayOrder> {
    documents
        .iter()
        .enumerate()
        .map(|(index, document)| DisplayOrder {
            document_id: document.document_id,
            display_order: index as i32,
        })
        .collect()
}

pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
