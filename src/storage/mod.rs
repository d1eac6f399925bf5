mod repository;

pub use repository::*;

/// SQL migration for the work entry table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration for operator accounts
pub const MIGRATION_002_USERS: &str = include_str!("migrations/002_users.sql");

/// SQL migration scoping work entries by owner; applied once, when the column is missing
pub const MIGRATION_003_OWNER_SCOPE: &str = include_str!("migrations/003_owner_scope.sql");
