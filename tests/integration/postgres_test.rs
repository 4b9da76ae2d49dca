//! Execution against a live PostgreSQL server.

use multisql::config::ConnectionTarget;
use multisql::db::{Connector, PostgresConnector, Value};
use multisql::executor::{execute_target, ExecutionOutcome};
use multisql::statement::StatementBatch;

/// Helper to get the test target from the environment.
fn get_test_target() -> Option<ConnectionTarget> {
    std::env::var("DATABASE_URL").ok().map(ConnectionTarget::new)
}

fn batch(sql: &str) -> StatementBatch {
    StatementBatch::from_sql("test.sql", sql)
}

#[tokio::test]
async fn test_select_returns_rows_in_order() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outcome = execute_target(
        &PostgresConnector::new(),
        &target,
        &batch("SELECT n, n * 2 AS doubled FROM generate_series(3, 1, -1) AS n"),
    )
    .await;

    let ExecutionOutcome::Rows(rows) = outcome else {
        panic!("Expected rows, got {:?}", outcome);
    };
    assert_eq!(rows.len(), 3);
    let ns: Vec<&Value> = rows.iter().filter_map(|row| row.get("n")).collect();
    assert_eq!(ns, vec![&Value::Int(3), &Value::Int(2), &Value::Int(1)]);
    let columns: Vec<&str> = rows[0].iter().map(|(name, _)| name).collect();
    assert_eq!(columns, vec!["n", "doubled"]);
}

#[tokio::test]
async fn test_statement_without_rows_is_empty() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outcome = execute_target(
        &PostgresConnector::new(),
        &target,
        &batch("CREATE TEMP TABLE multisql_empty (id int); INSERT INTO multisql_empty VALUES (1);"),
    )
    .await;

    assert_eq!(outcome, ExecutionOutcome::Empty);
}

#[tokio::test]
async fn test_bad_sql_is_driver_error() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outcome = execute_target(&PostgresConnector::new(), &target, &batch("SELEC 1")).await;

    match outcome {
        ExecutionOutcome::DriverError(msg) => assert!(msg.contains("syntax error")),
        other => panic!("Expected driver error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_statements_commit_independently() {
    let Some(target) = get_test_target() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let connector = PostgresConnector::new();

    // Nothing from the first session is left uncommitted for the second.
    let outcome = execute_target(
        &connector,
        &target,
        &batch(
            "DROP TABLE IF EXISTS multisql_autocommit;\
             CREATE TABLE multisql_autocommit (id int);\
             INSERT INTO multisql_autocommit VALUES (1);",
        ),
    )
    .await;
    assert_eq!(outcome, ExecutionOutcome::Empty);

    let outcome = execute_target(
        &connector,
        &target,
        &batch("SELECT count(*) AS n FROM multisql_autocommit"),
    )
    .await;
    let ExecutionOutcome::Rows(rows) = outcome else {
        panic!("Expected rows, got {:?}", outcome);
    };
    assert_eq!(rows[0].get("n"), Some(&Value::Int(1)));

    let mut session = connector.open(&target).await.unwrap();
    session
        .execute_batch("DROP TABLE multisql_autocommit")
        .await
        .unwrap();
    session.close().await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_unreachable_server_is_transport_error() {
    let outcome = execute_target(
        &PostgresConnector::new(),
        &ConnectionTarget::new("postgres://multisql@127.0.0.1:1/app"),
        &batch("SELECT 1"),
    )
    .await;

    assert!(matches!(outcome, ExecutionOutcome::TransportError(_)));
}
