//! Runs against a live database named by `DATABASE_URL`.
//!
//! `cargo test -p database -- --ignored`

use configuration::DatabaseSettings;
use core_types::{
    Binding, DataAccessSession, DispatchError, ParamDescriptor, Placeholder, PreparedQuery,
    ProcedureDeclaration, QueryText, SqlType, TransactionalBoundary, UnitOfWork, Value,
};
use database::{PgBoundary, PgSession, connect};
use std::collections::BTreeMap;

fn named(name: &str, value: impl Into<Value>) -> Binding {
    Binding {
        placeholder: Placeholder::Named(name.to_string()),
        value: value.into(),
        temporal: None,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn named_placeholders_and_paging() {
    let pool = connect(&DatabaseSettings::default()).await.unwrap();
    let session = PgSession::new(pool).with_named_queries(BTreeMap::from([(
        "Series.upTo".to_string(),
        "SELECT n FROM generate_series(1, :last) AS n ORDER BY n".to_string(),
    )]));

    let mut query = PreparedQuery::new("Series::upTo", QueryText::Named("Series.upTo".into()));
    query.bindings.push(named("last", 10));
    query.first_result = Some(2);
    query.max_results = Some(3);

    let rows = session.fetch(&query).await.unwrap();
    let values: Vec<_> = rows.iter().filter_map(|r| r.first().cloned()).collect();
    assert_eq!(values, vec![Value::Int(3), Value::Int(4), Value::Int(5)]);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn functions_prepare_and_return_their_row() {
    let pool = connect(&DatabaseSettings::default()).await.unwrap();
    let session = PgSession::new(pool);

    let declaration = ProcedureDeclaration {
        name: "upper".to_string(),
        function: true,
        parameters: vec![
            ParamDescriptor::output("upper", SqlType::Varchar),
            ParamDescriptor::input("text", SqlType::Varchar),
        ],
    };
    let compiled = session.prepare(declaration).await.unwrap();
    let row = session
        .call(&compiled, &[("text".to_string(), Value::Text("quarry".into()))])
        .await
        .unwrap();
    assert_eq!(row.first(), Some(&Value::Text("QUARRY".into())));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn unknown_procedures_fail_to_prepare() {
    let pool = connect(&DatabaseSettings::default()).await.unwrap();
    let session = PgSession::new(pool);
    let declaration = ProcedureDeclaration {
        name: "no_such_function_anywhere".to_string(),
        function: true,
        parameters: vec![ParamDescriptor::input("x", SqlType::Integer)],
    };
    assert!(session.prepare(declaration).await.is_err());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn failed_work_rolls_back() {
    let pool = connect(&DatabaseSettings::default()).await.unwrap();
    sqlx::query("CREATE TABLE IF NOT EXISTS quarry_rollback_check (id int)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("TRUNCATE quarry_rollback_check").execute(&pool).await.unwrap();

    let session = PgSession::new(pool.clone());
    let boundary = PgBoundary::read_write(pool.clone());
    let insert = PreparedQuery::new(
        "Scratch::insert",
        QueryText::Literal("INSERT INTO quarry_rollback_check VALUES (1)".into()),
    );
    let work: UnitOfWork<'_> = Box::pin(async {
        session.execute_update(&insert).await?;
        Err(DispatchError::EntityNotFound {
            method: "Scratch::insert".to_string(),
        })
    });
    assert!(boundary.run(work).await.is_err());

    let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM quarry_rollback_check")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn read_only_boundaries_reject_writes() {
    let pool = connect(&DatabaseSettings::default()).await.unwrap();
    let session = PgSession::new(pool.clone());
    let boundary = PgBoundary::read_only(pool);
    let write = PreparedQuery::new(
        "Scratch::create",
        QueryText::Literal("CREATE TEMP TABLE quarry_read_only_check (id int)".into()),
    );
    let work: UnitOfWork<'_> = Box::pin(async {
        session.execute_update(&write).await?;
        Ok(Value::Null)
    });
    assert!(boundary.run(work).await.is_err());
}
