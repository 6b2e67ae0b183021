use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::document::Document;
use crate::domain::{ApprovalLevelId, MilestoneId, PaymentRequestId, ProjectId};

/// Status string as reported by the backend.
///
/// The backend owns the transition table. The client only needs to recognise
/// the stages it renders specially; any other stage name is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    PendingReview,
    ApprovedForPayment,
    Rejected,
    ReturnedForCorrection,
    Stage(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingReview => "Pending Review",
            Self::ApprovedForPayment => "Approved for Payment",
            Self::Rejected => "Rejected",
            Self::ReturnedForCorrection => "Returned for Correction",
            Self::Stage(name) => name,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Pending Review" => Self::PendingReview,
            "Approved for Payment" => Self::ApprovedForPayment,
            "Rejected" => Self::Rejected,
            "Returned for Correction" => Self::ReturnedForCorrection,
            other => Self::Stage(other.to_string()),
        }
    }

    /// No further approval action is expected once a request reaches this stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ApprovedForPayment | Self::Rejected)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub request_id: PaymentRequestId,
    pub project_id: ProjectId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub current_approval_level_id: Option<ApprovalLevelId>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub milestone_ids: Vec<MilestoneId>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub photos: Vec<Document>,
}

/// Body of `POST /payment-requests`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentRequest {
    pub project_id: ProjectId,
    pub amount: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestone_ids: Vec<MilestoneId>,
}

#[cfg(test)]
mod tests {
    use super::{PaymentRequest, PaymentStatus};

    #[test]
    fn known_stages_parse_to_named_variants() {
        assert_eq!(PaymentStatus::parse("Pending Review"), PaymentStatus::PendingReview);
        assert_eq!(
            PaymentStatus::parse("Returned for Correction"),
            PaymentStatus::ReturnedForCorrection
        );
        assert_eq!(
            PaymentStatus::parse("Finance Review"),
            PaymentStatus::Stage("Finance Review".to_string())
        );
    }

    #[test]
    fn returned_for_correction_is_not_terminal() {
        assert!(!PaymentStatus::ReturnedForCorrection.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
        assert!(PaymentStatus::ApprovedForPayment.is_terminal());
        assert!(!PaymentStatus::Stage("Engineer Review".to_string()).is_terminal());
    }

    #[test]
    fn deserializes_backend_payload() {
        let request: PaymentRequest = serde_json::from_str(
            r#"{
                "requestId": 41,
                "projectId": 7,
                "amount": "125000.50",
                "description": "Phase 2 works",
                "paymentStatus": "M&E Officer Review",
                "currentApprovalLevelId": 3,
                "submittedAt": "2026-03-01T08:30:00Z",
                "documents": [],
                "photos": [{
                    "documentId": 9,
                    "documentType": "photo_payment",
                    "documentPath": "uploads/photos/site.jpg",
                    "displayOrder": 0
                }]
            }"#,
        )
        .expect("payment request payload");

        assert_eq!(request.request_id.0, 41);
        assert_eq!(request.payment_status.as_str(), "M&E Officer Review");
        assert_eq!(request.current_approval_level_id.map(|id| id.0), Some(3));
        assert_eq!(request.photos.len(), 1);
        assert!(request.milestone_ids.is_empty());
    }
}
