mod common;

use anyhow::Result;
use common::{StandardLedger, reopen, test_service};
use excavator_billing::domain::{Owner, WorkEntry};
use excavator_billing::storage::Repository;
use tempfile::TempDir;

#[tokio::test]
async fn test_initialize_is_idempotent_on_empty_store() -> Result<()> {
    let (service, temp) = test_service().await?;
    assert_eq!(service.repository().count_entries(Owner::Shared).await?, 0);

    service.repository().migrate().await?;
    service.repository().migrate().await?;
    let reopened = reopen(&temp).await?;

    assert_eq!(reopened.repository().count_entries(Owner::Shared).await?, 0);
    assert!(reopened.customers(Owner::Shared).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_initialize_leaves_populated_store_unchanged() -> Result<()> {
    let (service, temp) = test_service().await?;
    StandardLedger::create(&service, Owner::Shared).await?;
    let before = service.repository().load(Owner::Shared).await?;

    service.repository().migrate().await?;
    let reopened = reopen(&temp).await?;
    reopened.repository().migrate().await?;

    assert_eq!(reopened.repository().load(Owner::Shared).await?, before);
    Ok(())
}

/// Create the table the way a dataframe `to_sql(if_exists="replace")` leaves it:
/// no primary key, TEXT ids (all NULL) and whole-number money in INTEGER columns.
async fn legacy_dataframe_store(temp: &TempDir) -> Result<String> {
    let db_path = temp.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.display());

    let pool = sqlx::SqlitePool::connect(&url).await?;
    sqlx::query(
        r#"
        CREATE TABLE "excavator_data" (
            "id" TEXT,
            "user_id" INTEGER,
            "username" TEXT,
            "mobile" TEXT,
            "date" TEXT,
            "hours_worked" INTEGER,
            "cost_per_hour" INTEGER,
            "total_cost" INTEGER
        )
        "#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO "excavator_data" VALUES
            (NULL, 1, 'Suresh', '91', NULL, NULL, NULL, NULL),
            (NULL, 1, 'Suresh', '91', '2024-03-01', 3, 100, 300)
        "#,
    )
    .execute(&pool)
    .await?;
    pool.close().await;

    Ok(url)
}

#[tokio::test]
async fn test_initialize_upgrades_legacy_table_without_losing_rows() -> Result<()> {
    let temp = TempDir::new()?;
    let url = legacy_dataframe_store(&temp).await?;

    let repo = Repository::init(&url).await?;
    let entries = repo.load(Owner::Shared).await?;

    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_placeholder());
    assert_eq!(entries[0].id, None);
    assert_eq!(entries[1].customer_name, "Suresh");
    assert_eq!(entries[1].hours, Some(3.0));
    assert_eq!(entries[1].rate, Some(100.0));
    assert_eq!(entries[1].total_cost, Some(300.0));

    // Running again must not try to add the column twice
    repo.migrate().await?;
    assert_eq!(repo.count_entries(Owner::Shared).await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_legacy_table_keeps_order_through_writes() -> Result<()> {
    let temp = TempDir::new()?;
    legacy_dataframe_store(&temp).await?;
    let service = reopen(&temp).await?;

    service
        .record_work(Owner::Shared, 1, "2024-03-02", 2.5, 200.0)
        .await?;
    let anil = service.add_customer(Owner::Shared, "Anil", "92").await?;
    service.delete_entry(Owner::Shared, 0).await?;

    let entries = service.repository().load(Owner::Shared).await?;
    let dates: Vec<Option<&str>> = entries.iter().map(|e| e.date.as_deref()).collect();
    assert_eq!(dates, vec![Some("2024-03-01"), Some("2024-03-02"), None]);
    assert_eq!(anil.id, 2);
    assert_eq!(service.bill_total(Owner::Shared, 1).await?, 800.0);
    Ok(())
}

#[tokio::test]
async fn test_replace_all_is_a_full_overwrite() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let repo = service.repository();
    StandardLedger::create(&service, Owner::Shared).await?;

    let entries = repo.load(Owner::Shared).await?;
    assert_eq!(entries.len(), 5);

    repo.replace_all(Owner::Shared, &entries[..2]).await?;

    let reloaded = repo.load(Owner::Shared).await?;
    assert_eq!(reloaded, entries[..2].to_vec());
    Ok(())
}

#[tokio::test]
async fn test_replace_all_assigns_ids_to_new_records_after_existing_ones() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let repo = service.repository();

    repo.replace_all(
        Owner::Shared,
        &[
            WorkEntry::placeholder(1, "Suresh", "111"),
            WorkEntry::placeholder(2, "Anil", "222"),
        ],
    )
    .await?;
    let mut entries = repo.load(Owner::Shared).await?;
    assert!(entries.iter().all(|e| e.id.is_some()));

    entries.push(WorkEntry::placeholder(3, "Mohan", "333"));
    repo.replace_all(Owner::Shared, &entries).await?;

    let reloaded = repo.load(Owner::Shared).await?;
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded[0].id, entries[0].id);
    assert_eq!(reloaded[1].id, entries[1].id);
    assert_eq!(reloaded[2].customer_name, "Mohan");
    assert!(reloaded[2].id > reloaded[1].id);
    Ok(())
}

#[tokio::test]
async fn test_replace_all_only_touches_the_given_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.signup("ravi", "secret", None).await?;
    StandardLedger::create(&service, Owner::Shared).await?;
    StandardLedger::create(&service, account.owner()).await?;

    service
        .repository()
        .replace_all(account.owner(), &[])
        .await?;

    assert_eq!(service.repository().count_entries(account.owner()).await?, 0);
    assert_eq!(service.repository().count_entries(Owner::Shared).await?, 5);
    Ok(())
}
