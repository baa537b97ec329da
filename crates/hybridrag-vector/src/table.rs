//! LanceDB connection and housekeeping helpers.

use arrow_array::{RecordBatch, RecordBatchIterator};
use arrow_schema::ArrowError;
use lancedb::{connect, Connection};
use std::sync::Arc;

pub async fn open_db(uri: &str) -> lancedb::Result<Connection> {
    connect(uri).execute().await
}

pub async fn table_exists(conn: &Connection, name: &str) -> lancedb::Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> lancedb::Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(Vec::<Result<RecordBatch, ArrowError>>::new(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

/// SQL predicate selecting one topic label.
pub fn topic_filter(topic: &str) -> String {
    format!("topic = '{}'", topic.replace('\'', "''"))
}

/// SQL predicate selecting rows whose id is one of `ids`.
pub fn id_filter<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = ids.into_iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect();
    format!("id IN ({})", quoted.join(", "))
}
