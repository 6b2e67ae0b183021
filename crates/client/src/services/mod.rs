//! One accessor per backend area. Every call maps to exactly one request
//! unless documented otherwise.

pub mod approvals;
pub mod auth;
pub mod crud;
pub mod documents;
pub mod hr;
pub mod payments;
pub mod projects;
pub mod reports;
pub mod strategy;
pub mod users;

use ipmes_core::domain::records::Contractor;

use crate::http::ApiClient;

pub use approvals::ApprovalLevelsService;
pub use auth::{AuthService, Credentials};
pub use crud::CrudService;
pub use documents::DocumentsService;
pub use hr::HrService;
pub use payments::PaymentsService;
pub use projects::ProjectsService;
pub use reports::{Download, ReportFormat, ReportsService};
pub use strategy::StrategyService;
pub use users::UsersService;

impl ApiClient {
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn projects(&self) -> ProjectsService<'_> {
        ProjectsService::new(self)
    }

    pub fn payments(&self) -> PaymentsService<'_> {
        PaymentsService::new(self)
    }

    pub fn approval_levels(&self) -> ApprovalLevelsService<'_> {
        ApprovalLevelsService::new(self)
    }

    pub fn documents(&self) -> DocumentsService<'_> {
        DocumentsService::new(self)
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    pub fn hr(&self) -> HrService<'_> {
        HrService::new(self)
    }

    pub fn strategy(&self) -> StrategyService<'_> {
        StrategyService::new(self)
    }

    pub fn contractors(&self) -> CrudService<'_, Contractor> {
        CrudService::new(self)
    }

    pub fn reports(&self) -> ReportsService<'_> {
        ReportsService::new(self)
    }
}
