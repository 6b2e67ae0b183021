pub mod approvals;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forms;
pub mod generations;
pub mod optimistic;
pub mod privilege;
pub mod session;
pub mod upload;

pub use approvals::{ActionAvailability, ActionDraft, ApprovalGuard, GuardDenial};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::approval::{ApprovalAction, ApprovalHistoryEntry, ApprovalLevel};
pub use domain::document::{Document, DocumentType};
pub use domain::payment::{NewPaymentRequest, PaymentRequest, PaymentStatus};
pub use domain::records::Resource;
pub use domain::user::{User, UserSummary};
pub use domain::{
    ApprovalLevelId, DocumentId, MilestoneId, PaymentRequestId, ProjectId, RoleId, UserId,
};
pub use errors::{DomainError, Notice, Presentation, Severity};
pub use forms::{EntityForm, FieldDescriptor, FieldError, FieldKind, Submission};
pub use generations::{Generation, RequestGenerations};
pub use optimistic::{move_item, Optimistic, RollbackSource};
pub use privilege::{Privilege, PrivilegeSet};
pub use session::{FileTokenStore, InMemoryTokenStore, Session, SessionError, TokenStore};
pub use upload::{UploadFile, UploadForm, UploadPayload, UploadValidationError};
