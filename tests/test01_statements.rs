#![cfg(feature = "test-utils")]

mod common;

use std::error::Error;

use rds_data_driver::client::{SqlParameter, TypeHint};
use rds_data_driver::prelude::*;
use rds_data_driver::test_utils::records_response;

use common::{RESOURCE_ARN, SECRET_ARN, config, connection, mysql};

#[tokio::test]
async fn test01_positional_query_is_rewritten_and_tagged() -> Result<(), Box<dyn Error>> {
    let (client, conn) = mysql();
    client.push_records(
        &[("id", "INT"), ("name", "VARCHAR")],
        vec![vec![Field::LongValue(1), Field::StringValue("alice".into())]],
    );

    let stmt = conn.prepare("SELECT id, name FROM users WHERE id=? AND name=?")?;
    let mut rows = stmt
        .query_positional(&[RowValues::Int(1), "alice".into()])
        .await?;
    let row = rows.next_row()?.expect("one row");
    assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
    assert_eq!(row.get("name").and_then(RowValues::as_text), Some("alice"));
    assert!(rows.next_row()?.is_none());

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.sql, "SELECT id, name FROM users WHERE id=:1 AND name=:2");
    assert_eq!(req.resource_arn, RESOURCE_ARN);
    assert_eq!(req.secret_arn, SECRET_ARN);
    assert_eq!(req.database, "app");
    assert!(req.include_result_metadata);
    assert!(req.transaction_id.is_none());
    assert_eq!(
        req.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    Ok(())
}

#[tokio::test]
async fn test01_postgres_dollar_placeholders() -> Result<(), Box<dyn Error>> {
    let (client, conn) = connection(DialectKind::Postgres, config());
    conn.prepare("UPDATE t SET a=$2 WHERE b=$1")?
        .execute_positional(&[RowValues::Int(5), RowValues::Bool(true)])
        .await?;
    assert_eq!(client.executed_sql(), vec!["UPDATE t SET a=:2 WHERE b=:1"]);
    Ok(())
}

#[tokio::test]
async fn test01_mixed_parameters_send_nothing() {
    let (client, conn) = mysql();
    let args = [NamedValue::named("a", 1_i64), NamedValue::ordinal(1, 2_i64)];
    let err = conn.execute("SELECT ?", &args).await.unwrap_err();
    assert!(matches!(err, RdsDataError::MixedParameters));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test01_unsigned_overflow_sends_nothing() {
    let (client, conn) = mysql();
    let err = conn
        .prepare("INSERT INTO t VALUES (?)")
        .unwrap()
        .execute_positional(&[RowValues::UInt(u64::MAX)])
        .await
        .unwrap_err();
    assert!(matches!(err, RdsDataError::Overflow { .. }));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test01_timestamps_travel_with_a_hint() -> Result<(), Box<dyn Error>> {
    let (client, conn) = mysql();
    let ts = chrono::NaiveDate::from_ymd_opt(2021, 3, 4)
        .and_then(|d| d.and_hms_milli_opt(5, 6, 7, 500))
        .expect("valid timestamp");
    conn.execute("INSERT INTO t VALUES (:at)", &[NamedValue::named("at", ts)])
        .await?;
    assert_eq!(
        client.requests()[0].parameters,
        vec![SqlParameter {
            name: "at".into(),
            value: Field::StringValue("2021-03-04 05:06:07.5".into()),
            type_hint: Some(TypeHint::Timestamp),
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test01_multi_statement_rows_span_result_sets() -> Result<(), Box<dyn Error>> {
    let (client, conn) = connection(DialectKind::MySql, config().with_split_multi(true));
    client.push_records(&[("1", "BIGINT")], vec![vec![Field::LongValue(1)]]);
    client.push_records(&[("2", "BIGINT")], vec![vec![Field::LongValue(2)]]);

    let stmt = conn.prepare("SELECT 1; SELECT 2")?;
    assert_eq!(stmt.texts(), ["SELECT 1".to_string(), "SELECT 2".to_string()]);
    let mut rows = stmt.query(&[]).await?;

    assert_eq!(rows.columns(), ["1".to_string()]);
    let first = rows.next_row()?.expect("first result set");
    assert_eq!(first.get_by_index(0), Some(&RowValues::Int(1)));
    assert!(rows.has_next_result_set());
    assert!(rows.next_result_set());
    let second = rows.next_row()?.expect("second result set");
    assert_eq!(second.get_by_index(0), Some(&RowValues::Int(2)));
    assert!(!rows.has_next_result_set());
    assert!(rows.next_row()?.is_none());
    assert_eq!(client.executed_sql(), vec!["SELECT 1", "SELECT 2"]);
    Ok(())
}

#[tokio::test]
async fn test01_exec_result_sums_batch() -> Result<(), Box<dyn Error>> {
    let (client, conn) = connection(DialectKind::MySql, config().with_split_multi(true));
    client.push_update(1, vec![]);
    client.push_update(0, vec![]);
    client.push_update(2, vec![]);

    let res = conn
        .execute("DELETE FROM a; DELETE FROM b; DELETE FROM c;", &[])
        .await?;
    assert_eq!(res.rows_affected(), 3);
    assert_eq!(res.last_insert_id(), None);
    Ok(())
}

#[tokio::test]
async fn test01_last_insert_id_from_generated_field() -> Result<(), Box<dyn Error>> {
    let (client, conn) = mysql();
    client.push_update(1, vec![Field::LongValue(77)]);
    let res = conn
        .execute("INSERT INTO t (name) VALUES (:name)", &[NamedValue::named("name", "x")])
        .await?;
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(res.last_insert_id(), Some(77));
    Ok(())
}

#[tokio::test]
async fn test01_failure_stops_the_batch() {
    let (client, conn) = connection(DialectKind::MySql, config().with_split_multi(true));
    client.push_update(1, vec![]);
    client.push_failure("Duplicate entry");

    let err = conn
        .execute("INSERT INTO a VALUES (1); INSERT INTO a VALUES (1); SELECT 3", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, RdsDataError::Transport(_)));
    assert!(err.to_string().contains("Duplicate entry"));
    assert_eq!(client.executed_sql().len(), 2);
}

#[tokio::test]
async fn test01_without_split_the_text_goes_as_is() -> Result<(), Box<dyn Error>> {
    let (client, conn) = mysql();
    conn.execute("SELECT 1; SELECT 2", &[]).await?;
    assert_eq!(client.executed_sql(), vec!["SELECT 1; SELECT 2"]);
    Ok(())
}

#[tokio::test]
async fn test01_parse_time_decodes_temporal_columns() -> Result<(), Box<dyn Error>> {
    let (client, conn) = connection(DialectKind::MySql, config().with_parse_time(true));
    client.push_response(records_response(
        &[("d", "DATE"), ("flag", "BIT"), ("n", "DECIMAL")],
        vec![vec![
            Field::StringValue("2022-02-03".into()),
            Field::BooleanValue(true),
            Field::StringValue("12.50".into()),
        ]],
    ));
    let rs = conn.query("SELECT d, flag, n FROM t", &[]).await?.into_result_set()?;
    let row = &rs.results[0];
    assert_eq!(
        row.get("d"),
        Some(&RowValues::Date(
            chrono::NaiveDate::from_ymd_opt(2022, 2, 3).expect("valid date")
        ))
    );
    assert_eq!(row.get("flag"), Some(&RowValues::Int(1)));
    assert_eq!(row.get("n"), Some(&RowValues::Float(12.5)));
    Ok(())
}

#[tokio::test]
async fn test01_statement_close_and_ping() -> Result<(), Box<dyn Error>> {
    let (client, conn) = mysql();
    let mut stmt = conn.prepare("SELECT 1")?;
    assert_eq!(stmt.num_input(), None);
    stmt.close()?;
    assert!(matches!(stmt.close(), Err(RdsDataError::Closed)));
    assert!(matches!(stmt.execute(&[]).await, Err(RdsDataError::Closed)));

    conn.ping().await?;
    assert_eq!(client.executed_sql(), vec!["/* ping */ SELECT 1"]);
    Ok(())
}
