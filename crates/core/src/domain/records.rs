//! Administrative records managed through the generic CRUD dialogs.
//!
//! Each record keeps the fields the client reads plus a flattened map of
//! everything else the backend sends, so an edit round-trips fields this
//! crate does not model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{MilestoneId, ProjectId, RoleId};
use crate::forms::FieldDescriptor;
use crate::privilege::Privilege;

/// A backend collection that supports list/get/create/update/delete.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path, e.g. `/projects`.
    const COLLECTION: &'static str;
    /// Human label used in notices.
    const LABEL: &'static str;
    const READ: Privilege;
    const CREATE: Privilege;
    const UPDATE: Privilege;
    const DELETE: Privilege;

    fn id(&self) -> Option<i64>;

    fn form_fields() -> Vec<FieldDescriptor>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<ProjectId>,
    pub project_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cost_of_project: Option<Decimal>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Project {
    const COLLECTION: &'static str = "/projects";
    const LABEL: &'static str = "project";
    const READ: Privilege = Privilege::ProjectRead;
    const CREATE: Privilege = Privilege::ProjectCreate;
    const UPDATE: Privilege = Privilege::ProjectUpdate;
    const DELETE: Privilege = Privilege::ProjectDelete;

    fn id(&self) -> Option<i64> {
        self.id.map(|id| id.0)
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("projectName", "Project name").required(),
            FieldDescriptor::select(
                "status",
                "Status",
                &["Not Started", "In Progress", "Completed", "On Hold", "Cancelled"],
            ),
            FieldDescriptor::number("costOfProject", "Cost of project", Some(0.0)),
            FieldDescriptor::date("startDate", "Start date"),
            FieldDescriptor::date("endDate", "End date"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default)]
    pub milestone_id: Option<MilestoneId>,
    pub project_id: ProjectId,
    pub milestone_name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Milestone {
    const COLLECTION: &'static str = "/milestones";
    const LABEL: &'static str = "milestone";
    const READ: Privilege = Privilege::MilestoneRead;
    const CREATE: Privilege = Privilege::MilestoneCreate;
    const UPDATE: Privilege = Privilege::MilestoneUpdate;
    const DELETE: Privilege = Privilege::MilestoneDelete;

    fn id(&self) -> Option<i64> {
        self.milestone_id.map(|id| id.0)
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::integer("projectId", "Project", Some(1), None).required(),
            FieldDescriptor::text("milestoneName", "Milestone name").required(),
            FieldDescriptor::date("dueDate", "Due date"),
            FieldDescriptor::number("weight", "Weight", Some(0.0)),
            FieldDescriptor::checkbox("completed", "Completed"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    #[serde(default)]
    pub contractor_id: Option<i64>,
    pub company_name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Contractor {
    const COLLECTION: &'static str = "/contractors";
    const LABEL: &'static str = "contractor";
    const READ: Privilege = Privilege::ContractorRead;
    const CREATE: Privilege = Privilege::ContractorCreate;
    const UPDATE: Privilege = Privilege::ContractorUpdate;
    const DELETE: Privilege = Privilege::ContractorDelete;

    fn id(&self) -> Option<i64> {
        self.contractor_id
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("companyName", "Company name").required(),
            FieldDescriptor::text("contactPerson", "Contact person"),
            FieldDescriptor::text("email", "Email"),
            FieldDescriptor::text("phone", "Phone"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub role_id: Option<RoleId>,
    pub role_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Role {
    const COLLECTION: &'static str = "/users/roles";
    const LABEL: &'static str = "role";
    const READ: Privilege = Privilege::RoleRead;
    const CREATE: Privilege = Privilege::RoleCreate;
    const UPDATE: Privilege = Privilege::RoleUpdate;
    const DELETE: Privilege = Privilege::RoleDelete;

    fn id(&self) -> Option<i64> {
        self.role_id.map(|id| id.0)
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("roleName", "Role name").required(),
            FieldDescriptor::text_area("description", "Description"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeRecord {
    #[serde(default)]
    pub privilege_id: Option<i64>,
    pub privilege_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for PrivilegeRecord {
    const COLLECTION: &'static str = "/users/privileges";
    const LABEL: &'static str = "privilege";
    const READ: Privilege = Privilege::PrivilegeRead;
    const CREATE: Privilege = Privilege::PrivilegeCreate;
    const UPDATE: Privilege = Privilege::PrivilegeUpdate;
    const DELETE: Privilege = Privilege::PrivilegeDelete;

    fn id(&self) -> Option<i64> {
        self.privilege_id
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("privilegeName", "Privilege name").required(),
            FieldDescriptor::text_area("description", "Description"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Employee {
    const COLLECTION: &'static str = "/hr/employees";
    const LABEL: &'static str = "employee";
    const READ: Privilege = Privilege::EmployeeRead;
    const CREATE: Privilege = Privilege::EmployeeCreate;
    const UPDATE: Privilege = Privilege::EmployeeUpdate;
    const DELETE: Privilege = Privilege::EmployeeDelete;

    fn id(&self) -> Option<i64> {
        self.staff_id
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("firstName", "First name").required(),
            FieldDescriptor::text("lastName", "Last name").required(),
            FieldDescriptor::text("email", "Email"),
            FieldDescriptor::text("department", "Department"),
            FieldDescriptor::text("jobTitle", "Job title"),
            FieldDescriptor::date("startDate", "Start date"),
        ]
    }
}

/// A leave application filed under an employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub old_job_title: String,
    pub new_job_title: String,
    pub promotion_date: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicPlan {
    #[serde(default)]
    pub id: Option<i64>,
    pub cidp_name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for StrategicPlan {
    const COLLECTION: &'static str = "/strategy/plans";
    const LABEL: &'static str = "strategic plan";
    const READ: Privilege = Privilege::StrategicPlanRead;
    const CREATE: Privilege = Privilege::StrategicPlanCreate;
    const UPDATE: Privilege = Privilege::StrategicPlanUpdate;
    const DELETE: Privilege = Privilege::StrategicPlanDelete;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("cidpName", "Plan name").required(),
            FieldDescriptor::date("startDate", "Start date").required(),
            FieldDescriptor::date("endDate", "End date").required(),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub program_id: Option<i64>,
    pub cidpid: i64,
    pub program_name: String,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Program {
    const COLLECTION: &'static str = "/strategy/programs";
    const LABEL: &'static str = "program";
    const READ: Privilege = Privilege::StrategicPlanRead;
    const CREATE: Privilege = Privilege::StrategicPlanCreate;
    const UPDATE: Privilege = Privilege::StrategicPlanUpdate;
    const DELETE: Privilege = Privilege::StrategicPlanDelete;

    fn id(&self) -> Option<i64> {
        self.program_id
    }

    fn form_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::integer("cidpid", "Strategic plan", Some(1), None).required(),
            FieldDescriptor::text("programName", "Program name").required(),
            FieldDescriptor::integer("departmentId", "Department", Some(1), None),
            FieldDescriptor::text_area("remarks", "Remarks"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Milestone, Project, Resource};

    #[test]
    fn unmodelled_fields_survive_a_round_trip() {
        let raw = json!({
            "id": 4,
            "projectName": "Borehole rehabilitation",
            "status": "In Progress",
            "subCounty": "Kisumu West",
            "principalInvestigator": "Dr. Otieno"
        });

        let project: Project = serde_json::from_value(raw).expect("project");
        assert_eq!(project.id(), Some(4));
        assert_eq!(project.extra["subCounty"], json!("Kisumu West"));

        let back = serde_json::to_value(&project).expect("serialize");
        assert_eq!(back["principalInvestigator"], json!("Dr. Otieno"));
    }

    #[test]
    fn every_resource_requires_a_name_field() {
        assert!(Project::form_fields().iter().any(|field| field.required));
        assert!(Milestone::form_fields().iter().any(|field| field.name == "milestoneName"));
    }
}
