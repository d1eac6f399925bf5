use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{
    Account, Customer, CustomerId, Owner, PositionedEntry, WorkEntry, bill_link, bill_message,
    bill_total, customer_history, find_customer, hash_password, next_customer_id,
    project_customers,
};
use crate::storage::{AccountInsert, Repository};

use super::{AppError, WorkAnalysis, build_work_analysis};

/// Application service providing the billing operations.
///
/// Every mutation is a full load, in-memory change, and full rewrite of the
/// owner's entries. The internal lock serializes those cycles for callers
/// sharing this service; a second process writing the same database can
/// still lose updates.
pub struct BillingService {
    repo: Repository,
    write_lock: Mutex<()>,
}

/// A bill ready to hand to the messaging provider.
#[derive(Debug, Clone)]
pub struct Bill {
    pub customer: Customer,
    pub total: f64,
    pub message: String,
    pub link: String,
}

impl BillingService {
    /// Create a new billing service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Open (creating if needed) and initialize the database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// The underlying store, for reads that bypass the billing rules.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new operator account.
    pub async fn signup(
        &self,
        name: &str,
        password: &str,
        contact: Option<&str>,
    ) -> Result<Account, AppError> {
        let hash = hash_password(password);
        match self.repo.create_account(name, &hash, contact).await? {
            AccountInsert::Created(account) => {
                info!(account_id = account.id, name, "account created");
                Ok(account)
            }
            AccountInsert::DuplicateName => {
                debug!(name, "account name already taken");
                Err(AppError::AccountAlreadyExists(name.to_string()))
            }
        }
    }

    /// Check credentials and return the matching account.
    pub async fn login(&self, name: &str, password: &str) -> Result<Account, AppError> {
        self.repo
            .find_account(name, &hash_password(password))
            .await?
            .ok_or(AppError::InvalidCredentials)
    }

    // ========================
    // Customer operations
    // ========================

    /// Add a customer by writing a placeholder entry with the next free id.
    pub async fn add_customer(
        &self,
        owner: Owner,
        name: &str,
        contact: &str,
    ) -> Result<Customer, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.repo.load(owner).await?;
        let id = next_customer_id(&entries);
        entries.push(WorkEntry::placeholder(id, name, contact));
        self.repo.replace_all(owner, &entries).await?;

        info!(%owner, customer_id = id, name, "customer added");
        Ok(Customer {
            id,
            name: name.to_string(),
            contact: contact.to_string(),
        })
    }

    /// Distinct customers for the owner, in order of first appearance.
    pub async fn customers(&self, owner: Owner) -> Result<Vec<Customer>, AppError> {
        let entries = self.repo.load(owner).await?;
        Ok(project_customers(&entries))
    }

    /// Remove every entry carrying the customer id, placeholder included.
    /// Returns how many rows went; zero for an unknown id.
    pub async fn delete_customer(
        &self,
        owner: Owner,
        customer_id: CustomerId,
    ) -> Result<usize, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.repo.load(owner).await?;
        let before = entries.len();
        entries.retain(|e| e.customer_id != customer_id);
        let removed = before - entries.len();

        if removed == 0 {
            debug!(%owner, customer_id, "no entries for customer, nothing deleted");
            return Ok(0);
        }

        self.repo.replace_all(owner, &entries).await?;
        info!(%owner, customer_id, removed, "customer deleted");
        Ok(removed)
    }

    // ========================
    // Work entry operations
    // ========================

    /// Snapshot of the owner's entries with their current positions.
    pub async fn entries(&self, owner: Owner) -> Result<Vec<PositionedEntry>, AppError> {
        let entries = self.repo.load(owner).await?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| PositionedEntry { position, entry })
            .collect())
    }

    /// Record dated work for an existing customer.
    ///
    /// An unknown customer id is tolerated: nothing is written and `None`
    /// comes back.
    pub async fn record_work(
        &self,
        owner: Owner,
        customer_id: CustomerId,
        date: &str,
        hours: f64,
        rate: f64,
    ) -> Result<Option<WorkEntry>, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.repo.load(owner).await?;
        let Some(customer) = find_customer(&entries, customer_id) else {
            debug!(%owner, customer_id, "unknown customer, work not recorded");
            return Ok(None);
        };

        let entry = WorkEntry::work(&customer, date, hours, rate);
        entries.push(entry.clone());
        self.repo.replace_all(owner, &entries).await?;

        info!(%owner, customer_id, date, hours, rate, "work recorded");
        Ok(Some(entry))
    }

    /// Delete the entry at `position` in a fresh snapshot.
    ///
    /// Positions shift after every write. A position past the end is a
    /// no-op and returns `None`.
    pub async fn delete_entry(
        &self,
        owner: Owner,
        position: usize,
    ) -> Result<Option<WorkEntry>, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.repo.load(owner).await?;
        if position >= entries.len() {
            debug!(%owner, position, len = entries.len(), "stale position, nothing deleted");
            return Ok(None);
        }

        let removed = entries.remove(position);
        self.repo.replace_all(owner, &entries).await?;

        info!(%owner, position, customer_id = removed.customer_id, "entry deleted");
        Ok(Some(removed))
    }

    /// Dated entries for one customer, each with its snapshot position.
    pub async fn customer_history(
        &self,
        owner: Owner,
        customer_id: CustomerId,
    ) -> Result<Vec<PositionedEntry>, AppError> {
        let entries = self.repo.load(owner).await?;
        Ok(customer_history(&entries, customer_id))
    }

    // ========================
    // Billing operations
    // ========================

    /// Sum of the customer's work totals. Placeholders count as nothing.
    pub async fn bill_total(&self, owner: Owner, customer_id: CustomerId) -> Result<f64, AppError> {
        let entries = self.repo.load(owner).await?;
        Ok(bill_total(&entries, customer_id))
    }

    /// Build the bill message and messaging link for a customer.
    pub async fn bill(&self, owner: Owner, customer_id: CustomerId) -> Result<Bill, AppError> {
        let entries = self.repo.load(owner).await?;
        let customer = find_customer(&entries, customer_id)
            .ok_or(AppError::CustomerNotFound(customer_id))?;
        let total = bill_total(&entries, customer_id);

        Ok(Bill {
            message: bill_message(&customer.name, total),
            link: bill_link(&customer.contact, &customer.name, total),
            customer,
            total,
        })
    }

    /// Hours-over-time analysis for a customer.
    ///
    /// `None` when the owner has no hours recorded at all.
    pub async fn analysis(
        &self,
        owner: Owner,
        customer_id: CustomerId,
    ) -> Result<Option<WorkAnalysis>, AppError> {
        let entries = self.repo.load(owner).await?;

        let recorded_hours: f64 = entries.iter().filter_map(|e| e.hours).sum();
        if recorded_hours == 0.0 {
            return Ok(None);
        }

        let customer = find_customer(&entries, customer_id)
            .ok_or(AppError::CustomerNotFound(customer_id))?;
        Ok(Some(build_work_analysis(customer, &entries)))
    }
}
