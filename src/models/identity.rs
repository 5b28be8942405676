// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// A monitored identity from `/monitoring/identities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub uuid: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<String>,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Body for `POST /monitoring/identities`.
#[derive(Debug, Clone, Serialize)]
pub struct NewIdentity {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_name() {
        let identity: Identity = serde_json::from_str(
            r#"{"id": 1, "email": "target@example.com", "name": "J. Doe"}"#,
        )
        .unwrap();
        assert_eq!(identity.display_name(), "J. Doe");
    }

    #[test]
    fn test_new_identity_omits_empty_optionals() {
        let body = NewIdentity {
            email: "target@example.com".to_string(),
            name: "J. Doe".to_string(),
            username: None,
            phone: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("username"));
        assert!(!json.contains("phone"));
    }
}
