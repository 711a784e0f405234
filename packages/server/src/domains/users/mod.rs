pub mod models;
pub mod store;

pub use models::{UserData, UserRecord, UserRole};
pub use store::{InMemoryRoleStore, PostgresRoleStore, RoleStore};
