#![cfg(feature = "sqlite")]

use sql_crud_middleware::prelude::*;

async fn ledger() -> Result<CrudClient<SqliteConnection>, SqlCrudError> {
    let mut client = CrudClient::new(SqliteConnection::open_in_memory().await?);
    client
        .create_table(
            "ledger",
            &[
                ColumnDef::new("id", "INTEGER").auto_increment().into(),
                ColumnDef::new("amount", "INTEGER").not_null().into(),
            ],
            &TableOptions::default(),
        )
        .await?;
    Ok(client)
}

#[tokio::test]
async fn rollback_discards_and_commit_keeps() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ledger().await?;

    client.begin_transaction().await?;
    client.insert("ledger", &RowData::mapping([("amount", 10)])).await?;
    client.insert("ledger", &RowData::mapping([("amount", 20)])).await?;
    assert_eq!(client.count("ledger", &Conditions::new()).await?, 2);
    client.rollback().await?;
    assert_eq!(client.count("ledger", &Conditions::new()).await?, 0);

    client.begin_transaction().await?;
    client.insert("ledger", &RowData::mapping([("amount", 5)])).await?;
    client.commit().await?;
    assert_eq!(client.count("ledger", &Conditions::new()).await?, 1);
    assert!(!client.executor().in_transaction());
    Ok(())
}

#[tokio::test]
async fn transaction_misuse_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ledger().await?;

    let err = client.commit().await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Commit));

    client.begin_transaction().await?;
    let err = client.begin_transaction().await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::BeginTransaction));
    client.rollback().await?;

    let err = client.rollback().await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Rollback));
    Ok(())
}

#[tokio::test]
async fn ddl_inside_open_transaction_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ledger().await?;
    client.begin_transaction().await?;
    client
        .create_table("scratch", &[FieldSpec::literal("v", "TEXT")], &TableOptions::default())
        .await?;
    client.rollback().await?;

    let structure = client.get_table_structure("scratch").await?;
    assert!(structure.is_empty());
    Ok(())
}

#[tokio::test]
async fn positional_builder_runs_against_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let conn = ledger().await?.into_inner();
    let builder = StatementBuilder::new(Dialect::Sqlite).with_placeholders(PlaceholderStyle::Positional);
    let mut client = CrudClient::with_builder(conn, builder)?;

    client.insert("ledger", &RowData::mapping([("amount", 7)])).await?;
    let changed = client
        .update(
            "ledger",
            &RowData::mapping([("amount", 8)]),
            &Conditions::new().eq("amount", 7),
        )
        .await?;
    assert_eq!(changed, 1);
    assert_eq!(client.count("ledger", &Conditions::new().eq("amount", 8)).await?, 1);
    Ok(())
}

#[tokio::test]
async fn raw_connection_shares_transaction_state() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ledger().await?;
    let autocommit = client
        .executor()
        .with_connection(|conn| Ok(conn.is_autocommit()))
        .await?;
    assert!(autocommit);

    client.executor_mut().begin().await?;
    let autocommit = client
        .executor()
        .with_connection(|conn| Ok(conn.is_autocommit()))
        .await?;
    assert!(!autocommit);

    client
        .executor()
        .with_connection(|conn| {
            conn.execute_batch("INSERT INTO ledger (amount) VALUES (3)")?;
            Ok(())
        })
        .await?;
    client.rollback().await?;
    assert_eq!(client.count("ledger", &Conditions::new()).await?, 0);
    Ok(())
}
