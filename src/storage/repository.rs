use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::{Account, Owner, WorkEntry};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_USERS, MIGRATION_003_OWNER_SCOPE};

/// Outcome of inserting an account.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountInsert {
    Created(Account),
    /// The name is taken; nothing was written.
    DuplicateName,
}

/// Repository for persisting accounts and work entries.
///
/// Work entries are only ever rewritten wholesale per owner: read with
/// [`Repository::load`], change in memory, write back with
/// [`Repository::replace_all`]. Nothing here guards against two writers
/// interleaving those steps.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables and columns. Safe to run on every startup;
    /// existing rows are never touched.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_USERS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        // SQLite has no ADD COLUMN IF NOT EXISTS
        let owner_column: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM pragma_table_info('excavator_data') WHERE name = 'owner_id'",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to inspect excavator_data columns")?
        .get("count");

        if owner_column == 0 {
            sqlx::query(MIGRATION_003_OWNER_SCOPE)
                .execute(&self.pool)
                .await
                .context("Failed to run migration 003")?;
        }

        Ok(())
    }

    /// Initialize the store (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Work entry operations
    // ========================

    /// Snapshot of every work entry belonging to `owner`, in insertion order.
    ///
    /// Tables rewritten by other tools may declare any column affinity (whole
    /// hours land in INTEGER columns, ids in TEXT), so every column is cast to
    /// the type the entry expects. Such tables have no integer primary key and
    /// usually NULL ids, hence ordering by `rowid` rather than `id`.
    pub async fn load(&self, owner: Owner) -> Result<Vec<WorkEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT
                CAST(id AS INTEGER) AS id,
                CAST(user_id AS INTEGER) AS user_id,
                CAST(username AS TEXT) AS username,
                CAST(mobile AS TEXT) AS mobile,
                CAST(date AS TEXT) AS date,
                CAST(hours_worked AS REAL) AS hours_worked,
                CAST(cost_per_hour AS REAL) AS cost_per_hour,
                CAST(total_cost AS REAL) AS total_cost
            FROM excavator_data
            WHERE owner_id IS ?
            ORDER BY rowid
            "#,
        )
        .bind(owner.as_column())
        .fetch_all(&self.pool)
        .await
        .context("Failed to load work entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Overwrite everything stored for `owner` with `records`, in one transaction.
    ///
    /// Records are inserted in order, so they load back in the same order.
    /// They keep their row id when they have one; the rest get fresh ids.
    pub async fn replace_all(&self, owner: Owner, records: &[WorkEntry]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM excavator_data WHERE owner_id IS ?")
            .bind(owner.as_column())
            .execute(&mut *tx)
            .await
            .context("Failed to clear work entries")?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO excavator_data (id, owner_id, user_id, username, mobile, date, hours_worked, cost_per_hour, total_cost)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.id)
            .bind(owner.as_column())
            .bind(record.customer_id)
            .bind(&record.customer_name)
            .bind(&record.contact)
            .bind(&record.date)
            .bind(record.hours)
            .bind(record.rate)
            .bind(record.total_cost)
            .execute(&mut *tx)
            .await
            .context("Failed to write work entry")?;
        }

        tx.commit().await.context("Failed to commit work entries")?;
        Ok(())
    }

    /// Number of work entries stored for `owner`.
    pub async fn count_entries(&self, owner: Owner) -> Result<i64> {
        let count: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM excavator_data WHERE owner_id IS ?")
                .bind(owner.as_column())
                .fetch_one(&self.pool)
                .await
                .context("Failed to count work entries")?
                .get("count");
        Ok(count)
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<WorkEntry> {
        Ok(WorkEntry {
            id: row.try_get("id").context("Invalid entry id")?,
            customer_id: row
                .try_get::<Option<i64>, _>("user_id")
                .context("Invalid customer id")?
                .unwrap_or_default(),
            customer_name: row
                .try_get::<Option<String>, _>("username")
                .context("Invalid customer name")?
                .unwrap_or_default(),
            contact: row
                .try_get::<Option<String>, _>("mobile")
                .context("Invalid contact")?
                .unwrap_or_default(),
            date: row.try_get("date").context("Invalid date")?,
            hours: row.try_get("hours_worked").context("Invalid hours")?,
            rate: row.try_get("cost_per_hour").context("Invalid cost per hour")?,
            total_cost: row.try_get("total_cost").context("Invalid total cost")?,
        })
    }

    // ========================
    // Account operations
    // ========================

    /// Insert an account. A taken name yields [`AccountInsert::DuplicateName`]
    /// rather than an error.
    pub async fn create_account(
        &self,
        name: &str,
        password_hash: &str,
        contact: Option<&str>,
    ) -> Result<AccountInsert> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, mobile)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .bind(contact)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(AccountInsert::Created(Account {
                id: row.get("id"),
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                contact: contact.map(str::to_string),
            })),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(AccountInsert::DuplicateName)
            }
            Err(e) => Err(e).context("Failed to create account"),
        }
    }

    /// Find the account whose name and password hash both match exactly.
    pub async fn find_account(&self, name: &str, password_hash: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, mobile
            FROM users
            WHERE username = ? AND password = ?
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        Ok(row.map(|row| Self::row_to_account(&row)))
    }

    /// Get an account by name.
    pub async fn get_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, username, password, mobile FROM users WHERE username = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account by name")?;

        Ok(row.map(|row| Self::row_to_account(&row)))
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            name: row.get("username"),
            password_hash: row.get("password"),
            contact: row.get("mobile"),
        }
    }
}
