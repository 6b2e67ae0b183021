use ipmes_core::domain::records::{Employee, LeaveApplication, Promotion};

use super::crud::CrudService;
use crate::error::ClientError;
use crate::http::ApiClient;

pub struct HrService<'a> {
    api: &'a ApiClient,
}

impl<'a> HrService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn employees(&self) -> CrudService<'a, Employee> {
        CrudService::new(self.api)
    }

    pub async fn leave_applications(&self, staff_id: i64) -> Result<Vec<LeaveApplication>, ClientError> {
        self.api.get(&format!("/hr/employees/{staff_id}/leave-applications")).await
    }

    pub async fn apply_for_leave(
        &self,
        staff_id: i64,
        application: &LeaveApplication,
    ) -> Result<LeaveApplication, ClientError> {
        self.api.post(&format!("/hr/employees/{staff_id}/leave-applications"), application).await
    }

    pub async fn promotions(&self, staff_id: i64) -> Result<Vec<Promotion>, ClientError> {
        self.api.get(&format!("/hr/employees/{staff_id}/promotions")).await
    }

    pub async fn record_promotion(
        &self,
        staff_id: i64,
        promotion: &Promotion,
    ) -> Result<Promotion, ClientError> {
        self.api.post(&format!("/hr/employees/{staff_id}/promotions"), promotion).await
    }
}
