use chrono::{DateTime, Utc};

use crate::model::{HttpMethod, RequestData, UserData};

pub const SERVICE_HOST: &str = "service.example";

/// The built-in user record attached to the POST fixture.
#[must_use]
pub fn mock_user(created_at: DateTime<Utc>) -> UserData {
    UserData {
        name: "User Name".to_string(),
        age: 26,
        roles: vec!["user".to_string(), "admin".to_string()],
        created_at,
        is_deleted: false,
    }
}

/// Create-user POST followed by a lookup GET.
#[must_use]
pub fn mock_requests(now: DateTime<Utc>) -> Vec<RequestData> {
    vec![
        RequestData::new(HttpMethod::Post, SERVICE_HOST, "user").with_body(mock_user(now)),
        RequestData::new(HttpMethod::Get, SERVICE_HOST, "user").with_param("id", "3f5h67s4s"),
    ]
}
