use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Phone number owned by exactly one user. Stored and loaded only as part
/// of its owner's aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub number: String,
    pub citycode: String,
    pub contrycode: String,
}

/// User aggregate: the account row plus every phone it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never plaintext
    pub phones: Vec<Phone>,
    pub created: OffsetDateTime,
    pub modified: OffsetDateTime,
    pub last_login: OffsetDateTime,
    pub token: Option<String>,
    pub is_active: bool,
}

impl User {
    /// Fresh, active, tokenless account. `created`, `modified` and
    /// `last_login` all start at the same instant.
    pub fn new(name: String, email: String, password_hash: String, phones: Vec<Phone>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            phones,
            created: now,
            modified: now,
            last_login: now,
            token: None,
            is_active: true,
        }
    }

    pub fn record_login(&mut self, token: String) {
        self.token = Some(token);
        self.last_login = OffsetDateTime::now_utc().max(self.last_login);
    }
}

/// `users` row without its phones.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created: OffsetDateTime,
    pub modified: OffsetDateTime,
    pub last_login: OffsetDateTime,
    pub token: Option<String>,
    pub is_active: bool,
}

impl UserRow {
    pub(crate) fn into_user(self, phones: Vec<Phone>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            phones,
            created: self.created,
            modified: self.modified,
            last_login: self.last_login,
            token: self.token,
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active_with_aligned_timestamps() {
        let user = User::new(
            "Ana".into(),
            "ana@x.com".into(),
            "$argon2id$fake".into(),
            vec![],
        );
        assert!(user.is_active);
        assert!(user.token.is_none());
        assert_eq!(user.created, user.modified);
        assert_eq!(user.created, user.last_login);
    }

    #[test]
    fn record_login_never_moves_last_login_backwards() {
        let mut user = User::new("Ana".into(), "ana@x.com".into(), "h".into(), vec![]);
        let before = user.last_login;
        user.record_login("t1".into());
        assert!(user.last_login >= before);
        assert_eq!(user.token.as_deref(), Some("t1"));
    }

    #[test]
    fn serialized_user_omits_password_hash() {
        let user = User::new("Ana".into(), "ana@x.com".into(), "secret-hash".into(), vec![]);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
