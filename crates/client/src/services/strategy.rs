use ipmes_core::domain::records::{Program, StrategicPlan};

use super::crud::CrudService;
use crate::http::ApiClient;

pub struct StrategyService<'a> {
    api: &'a ApiClient,
}

impl<'a> StrategyService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn plans(&self) -> CrudService<'a, StrategicPlan> {
        CrudService::new(self.api)
    }

    pub fn programs(&self) -> CrudService<'a, Program> {
        CrudService::new(self.api)
    }
}
