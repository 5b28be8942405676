// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Profile record for the logged-in account, as returned by `/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub profession: Option<String>,
    pub image_url: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_superuser {
            "Administrator"
        } else {
            "Analyst"
        }
    }
}

/// Body for `PUT /users/me`. Only the fields the profile form edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: 1,
            email: "analyst@example.com".to_string(),
            name: String::new(),
            is_active: true,
            is_superuser: false,
            phone_number: None,
            bio: None,
            profession: None,
            image_url: None,
        };
        assert_eq!(user.display_name(), "analyst@example.com");
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"name":"New Name"}"#);
    }
}
