// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use excavator_billing::application::BillingService;
use excavator_billing::domain::{Customer, Owner};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BillingService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BillingService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Re-open the database inside an existing temp dir
pub async fn reopen(temp_dir: &TempDir) -> Result<BillingService> {
    let db_path = temp_dir.path().join("test.db");
    Ok(BillingService::init(db_path.to_str().unwrap()).await?)
}

/// Test fixture: a couple of customers with some recorded work
pub struct StandardLedger;

impl StandardLedger {
    /// Suresh (id 1) with 3h @ 100 and 2.5h @ 200; Anil (id 2) with 8h @ 150
    pub async fn create(service: &BillingService, owner: Owner) -> Result<(Customer, Customer)> {
        let suresh = service
            .add_customer(owner, "Suresh", "919800000001")
            .await?;
        let anil = service.add_customer(owner, "Anil", "919800000002").await?;

        service
            .record_work(owner, suresh.id, "2024-03-01", 3.0, 100.0)
            .await?;
        service
            .record_work(owner, anil.id, "2024-03-01", 8.0, 150.0)
            .await?;
        service
            .record_work(owner, suresh.id, "2024-03-02", 2.5, 200.0)
            .await?;

        Ok((suresh, anil))
    }
}
