use serde::{Deserialize, Serialize};

use crate::domain::{RoleId, UserId};
use crate::privilege::{Privilege, PrivilegeSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role_id: RoleId,
    #[serde(default, alias = "role")]
    pub role_name: Option<String>,
    #[serde(default)]
    pub privileges: PrivilegeSet,
}

impl User {
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.privileges.contains(privilege)
    }

    pub fn display_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
            .unwrap_or_else(|| self.username.clone())
    }
}

/// Entry of the user directory used to label history rows and reassignment targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role_id: Option<RoleId>,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("user #{}", self.user_id))
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::{User, UserSummary};
    use crate::domain::UserId;
    use crate::privilege::Privilege;

    #[test]
    fn user_payload_with_id_alias_deserializes() {
        let user: User = serde_json::from_str(
            r#"{"id": 12, "username": "akinyi", "roleId": 4, "role": "Finance Officer",
                "privileges": ["payment_request.update", "dashboard.view"]}"#,
        )
        .expect("user payload");

        assert_eq!(user.user_id, UserId(12));
        assert_eq!(user.role_name.as_deref(), Some("Finance Officer"));
        assert!(user.has_privilege(Privilege::PaymentRequestUpdate));
        assert!(!user.has_privilege(Privilege::PaymentRequestDelete));
        assert_eq!(user.display_name(), "akinyi");
    }

    #[test]
    fn summary_display_name_falls_back_to_id() {
        let summary = UserSummary {
            user_id: UserId(3),
            username: None,
            first_name: Some(" ".to_string()),
            last_name: None,
            role_id: None,
        };
        assert_eq!(summary.display_name(), "user #3");
    }
}
