//! `PgUserStore` against a real Postgres. Ignored by default; run with
//! `DATABASE_URL=postgres://... cargo test --test pg_store_tests -- --ignored`.

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use user_registry::users::{PgUserStore, Phone, StoreError, User, UserStore};

async fn store() -> PgUserStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    PgUserStore::new(pool)
}

fn unique_email() -> String {
    format!("pg-{}@x.com", Uuid::new_v4())
}

fn phone(number: &str) -> Phone {
    Phone {
        number: number.into(),
        citycode: "1".into(),
        contrycode: "57".into(),
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn saved_user_is_found_with_phones_in_order() {
    let store = store().await;
    let email = unique_email();
    let user = User::new(
        "Ana".into(),
        email.clone(),
        "hash".into(),
        vec![phone("1"), phone("2")],
    );
    store.save(user.clone()).await.unwrap();

    assert!(store.exists_by_email(&email).await.unwrap());
    let found = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.phones, vec![phone("1"), phone("2")]);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn user_without_phones_loads_an_empty_list() {
    let store = store().await;
    let email = unique_email();
    store
        .save(User::new("Ana".into(), email.clone(), "hash".into(), vec![]))
        .await
        .unwrap();

    let found = store.find_by_email(&email).await.unwrap().unwrap();
    assert!(found.phones.is_empty());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn second_owner_of_an_email_is_duplicate() {
    let store = store().await;
    let email = unique_email();
    store
        .save(User::new("Ana".into(), email.clone(), "hash".into(), vec![]))
        .await
        .unwrap();

    let err = store
        .save(User::new("Bea".into(), email.clone(), "hash".into(), vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(e) if e == email));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn update_replaces_phones_and_keeps_created() {
    let store = store().await;
    let email = unique_email();
    let saved = store
        .save(User::new(
            "Ana".into(),
            email.clone(),
            "hash".into(),
            vec![phone("1"), phone("2")],
        ))
        .await
        .unwrap();

    let mut changed = saved.clone();
    changed.phones = vec![phone("3")];
    let updated = store.save(changed).await.unwrap();
    assert!(updated.modified >= saved.modified);

    let found = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.phones, vec![phone("3")]);
    assert_eq!(found.created, saved.created);
}
