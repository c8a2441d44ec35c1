pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod store;

pub use memory::MemoryUserStore;
pub use repo::PgUserStore;
pub use repo_types::{Phone, User};
pub use store::{StoreError, UserStore};
