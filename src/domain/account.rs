use serde::{Deserialize, Serialize};

pub type AccountId = i64;

/// Whose slice of the ledger an operation addresses.
///
/// Work entries written before accounts existed carry no owner; they are
/// addressed as `Shared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Shared,
    Account(AccountId),
}

impl Owner {
    /// The value stored in the `owner_id` column.
    pub fn as_column(&self) -> Option<AccountId> {
        match self {
            Owner::Shared => None,
            Owner::Account(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Shared => write!(f, "shared"),
            Owner::Account(id) => write!(f, "account:{}", id),
        }
    }
}

/// An operator account. Created at signup, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub contact: Option<String>,
}

impl Account {
    pub fn owner(&self) -> Owner {
        Owner::Account(self.id)
    }
}
