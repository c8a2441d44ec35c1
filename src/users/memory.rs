use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo_types::User,
    store::{StoreError, UserStore},
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Process-local [`UserStore`]. The uniqueness check and the write share
/// one write lock, so two saves of the same email cannot both succeed.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.by_email.contains_key(email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(owner) = inner.by_email.get(&user.email) {
            if *owner != user.id {
                return Err(StoreError::DuplicateEmail(user.email));
            }
        }

        let previous = inner
            .users
            .get(&user.id)
            .map(|u| (u.created, u.email.clone()));
        if let Some((created, old_email)) = previous {
            user.created = created;
            user.modified = OffsetDateTime::now_utc().max(user.modified);
            if old_email != user.email {
                inner.by_email.remove(&old_email);
            }
        }

        inner.by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Phone;
    use std::sync::Arc;

    fn phone(number: &str) -> Phone {
        Phone {
            number: number.into(),
            citycode: "1".into(),
            contrycode: "57".into(),
        }
    }

    fn user(email: &str) -> User {
        User::new("Ana".into(), email.into(), "hash".into(), vec![phone("123")])
    }

    #[tokio::test]
    async fn save_then_find_by_email() {
        let store = MemoryUserStore::new();
        let saved = store.save(user("ana@x.com")).await.unwrap();

        assert!(store.exists_by_email("ana@x.com").await.unwrap());
        let found = store.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.phones, vec![phone("123")]);
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_rejects_second_user_with_same_email() {
        let store = MemoryUserStore::new();
        store.save(user("ana@x.com")).await.unwrap();

        let err = store.save(user("ana@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(e) if e == "ana@x.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_keeps_created_and_refreshes_modified() {
        let store = MemoryUserStore::new();
        let mut saved = store.save(user("ana@x.com")).await.unwrap();
        let created = saved.created;

        saved.token = Some("t".into());
        saved.created = OffsetDateTime::UNIX_EPOCH;
        let updated = store.save(saved).await.unwrap();

        assert_eq!(updated.created, created);
        assert!(updated.modified >= created);
        assert_eq!(updated.token.as_deref(), Some("t"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_replaces_phone_list() {
        let store = MemoryUserStore::new();
        let mut u = user("ana@x.com");
        u.phones.push(phone("456"));
        let mut saved = store.save(u).await.unwrap();

        saved.phones.retain(|p| p.number != "123");
        store.save(saved).await.unwrap();

        let found = store.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(found.phones, vec![phone("456")]);
    }

    #[tokio::test]
    async fn changing_email_moves_the_index() {
        let store = MemoryUserStore::new();
        let mut saved = store.save(user("old@x.com")).await.unwrap();
        saved.email = "new@x.com".into();
        store.save(saved).await.unwrap();

        assert!(!store.exists_by_email("old@x.com").await.unwrap());
        assert!(store.exists_by_email("new@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_saves_with_one_email_admit_exactly_one() {
        let store = Arc::new(MemoryUserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.save(user("race@x.com")).await })
            })
            .collect();

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.len().await, 1);
    }
}
