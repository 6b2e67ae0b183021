pub mod approval;
pub mod document;
pub mod payment;
pub mod records;
pub mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($($name:ident),+ $(,)?) => {
        $(
            #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

numeric_id!(
    PaymentRequestId,
    ProjectId,
    MilestoneId,
    ApprovalLevelId,
    DocumentId,
    UserId,
    RoleId,
);
