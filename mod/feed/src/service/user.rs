use karmafeed_core::{ServiceError, new_id, now_rfc3339};
use karmafeed_sql::Value;

use super::FeedService;
use crate::model::User;

impl FeedService {
    /// Create a new user. Usernames are unique; a duplicate is a Conflict.
    pub fn create_user(&self, username: &str) -> Result<User, ServiceError> {
        let username = username.trim();
        if username.len() < 3 {
            return Err(ServiceError::Validation(
                "username must be at least 3 characters".into(),
            ));
        }

        let user = User {
            id: new_id(),
            username: username.to_string(),
            create_at: now_rfc3339(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("username", Value::Text(user.username.clone())),
                ("create_at", Value::Text(user.create_at.clone())),
            ],
        )
        .map_err(|e| match e {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("username '{}' is taken", user.username))
            }
            other => other,
        })?;

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.get_record("users", id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::FeedConfig;
    use super::*;
    use karmafeed_sql::SqliteStore;

    fn test_service() -> FeedService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        FeedService::new(sql, FeedConfig::default()).unwrap()
    }

    #[test]
    fn create_and_get_user() {
        let svc = test_service();
        let user = svc.create_user("alice").unwrap();
        assert_eq!(user.username, "alice");

        let fetched = svc.get_user(&user.id).unwrap();
        assert_eq!(fetched, user);
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let svc = test_service();
        svc.create_user("alice").unwrap();
        let err = svc.create_user("alice").unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn short_username_rejected() {
        let svc = test_service();
        let err = svc.create_user("ab").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let svc = test_service();
        let err = svc.get_user("nope").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
