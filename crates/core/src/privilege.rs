//! Namespaced capability tokens.
//!
//! The backend hands out privileges as opaque strings (`payment_request.update`).
//! They are parsed into [`Privilege`] at the edge so that call sites check a
//! closed set of variants instead of string literals.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown privilege `{0}`")]
pub struct UnknownPrivilege(pub String);

macro_rules! privileges {
    ($($variant:ident => $wire:literal,)+) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Privilege {
            $($variant,)+
        }

        impl Privilege {
            pub const ALL: &'static [Privilege] = &[$(Privilege::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for Privilege {
            type Err = UnknownPrivilege;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownPrivilege(other.to_string())),
                }
            }
        }
    };
}

privileges! {
    PaymentRequestCreate => "payment_request.create",
    PaymentRequestRead => "payment_request.read",
    PaymentRequestUpdate => "payment_request.update",
    PaymentRequestDelete => "payment_request.delete",
    ApprovalLevelCreate => "approval_levels.create",
    ApprovalLevelRead => "approval_levels.read",
    ApprovalLevelUpdate => "approval_levels.update",
    ApprovalLevelDelete => "approval_levels.delete",
    ProjectCreate => "project.create",
    ProjectRead => "project.read_all",
    ProjectUpdate => "project.update",
    ProjectDelete => "project.delete",
    MilestoneCreate => "milestone.create",
    MilestoneRead => "milestone.read",
    MilestoneUpdate => "milestone.update",
    MilestoneDelete => "milestone.delete",
    DocumentCreate => "document.create",
    DocumentRead => "document.read",
    DocumentUpdate => "document.update",
    DocumentDelete => "document.delete",
    UserCreate => "user.create",
    UserRead => "user.read_all",
    UserUpdate => "user.update",
    UserDelete => "user.delete",
    RoleCreate => "role.create",
    RoleRead => "role.read_all",
    RoleUpdate => "role.update",
    RoleDelete => "role.delete",
    PrivilegeCreate => "privilege.create",
    PrivilegeRead => "privilege.read_all",
    PrivilegeUpdate => "privilege.update",
    PrivilegeDelete => "privilege.delete",
    EmployeeCreate => "employee.create",
    EmployeeRead => "employee.read_all",
    EmployeeUpdate => "employee.update",
    EmployeeDelete => "employee.delete",
    StrategicPlanCreate => "strategic_plan.create",
    StrategicPlanRead => "strategic_plan.read_all",
    StrategicPlanUpdate => "strategic_plan.update",
    StrategicPlanDelete => "strategic_plan.delete",
    ContractorCreate => "contractors.create",
    ContractorRead => "contractors.read",
    ContractorUpdate => "contractors.update",
    ContractorDelete => "contractors.delete",
    ReportExport => "reports.export",
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Privilege {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Privilege {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The privileges granted to one user.
///
/// Deserialization is lenient: strings that do not name a known privilege
/// are dropped, since the backend may grant capabilities this client never
/// checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrivilegeSet(BTreeSet<Privilege>);

impl PrivilegeSet {
    pub fn contains(&self, privilege: Privilege) -> bool {
        self.0.contains(&privilege)
    }

    pub fn insert(&mut self, privilege: Privilege) -> bool {
        self.0.insert(privilege)
    }

    pub fn iter(&self) -> impl Iterator<Item = Privilege> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_wire<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for value in values {
            match value.as_ref().parse::<Privilege>() {
                Ok(privilege) => {
                    set.insert(privilege);
                }
                Err(UnknownPrivilege(raw)) => {
                    debug!(
                        event_name = "session.privilege.unrecognized",
                        privilege = %raw,
                        "ignoring privilege the client does not check"
                    );
                }
            }
        }
        Self(set)
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<T: IntoIterator<Item = Privilege>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for PrivilegeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Privilege::as_str))
    }
}

impl<'de> Deserialize<'de> for PrivilegeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::from_wire(raw))
    }
}
