use super::DataSource;
use crate::backend::model::{Column, ColumnType, FetchRequest, FetchResponse, Filter, Row};
use crate::error::{Result, TableError};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter};
use serde_json::{Number, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serves requests from a local SQLite database.
///
/// The table is the last path segment of the fetch url, so
/// `sqlite:///customers` reads the `customers` table.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("📂 Using database at: {}", path.display());
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Creates and fills the `customers` table used by `--demo`.
    pub async fn seed_demo(&self, count: usize) -> Result<()> {
        const NAMES: [&str; 8] = [
            "Avery", "Blake", "Casey", "Drew", "Emery", "Finley", "Harper", "Jordan",
        ];
        const CITIES: [&str; 5] = ["Oslo", "Lyon", "Porto", "Ghent", "Turku"];

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                Id INTEGER PRIMARY KEY,
                Name TEXT NOT NULL,
                City TEXT NOT NULL,
                Balance REAL NOT NULL,
                CreatedAt TEXT NOT NULL,
                Active INTEGER NOT NULL
            )
            "#,
            [],
        )?;
        for i in 1..=count {
            let name = format!("{} {}", NAMES[i % NAMES.len()], i);
            let city = CITIES[(i * 7) % CITIES.len()];
            let balance = ((i * 7919) % 100_000) as f64 / 7.0;
            let created = format!("2024-{:02}-{:02}", (i % 12) + 1, (i % 28) + 1);
            tx.execute(
                "INSERT OR REPLACE INTO customers (Id, Name, City, Balance, CreatedAt, Active) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![i as i64, name, city, balance, created, (i % 3 != 0) as i64],
            )?;
        }
        tx.commit()?;
        log::info!("Seeded {count} demo customers");
        Ok(())
    }
}

/// Columns matching the demo `customers` table.
pub fn demo_columns() -> Vec<Column> {
    vec![
        Column::new("Id", ColumnType::Number),
        Column::new("Name", ColumnType::String),
        Column::new("City", ColumnType::String),
        Column::new("Balance", ColumnType::Currency),
        Column::new("CreatedAt", ColumnType::Date),
    ]
}

#[async_trait::async_trait]
impl DataSource for SqliteSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch(&self, url: &str, request: &FetchRequest) -> Result<FetchResponse> {
        let table = table_from_url(url)?;
        let conn = self.conn.lock().await;
        query_page(&conn, &table, request)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn table_from_url(url: &str) -> Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let table = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if is_identifier(table) {
        Ok(table.to_string())
    } else {
        Err(TableError::InvalidTable(url.to_string()))
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut columns = Vec::new();
    for r in rows {
        columns.push(r?);
    }
    if columns.is_empty() {
        return Err(TableError::InvalidTable(table.to_string()));
    }
    Ok(columns)
}

fn known_column<'a>(known: &'a [String], name: &str) -> Result<&'a str> {
    known
        .iter()
        .find(|c| c.as_str() == name)
        .map(String::as_str)
        .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
}

fn where_clause(filters: &[Filter], known: &[String]) -> Result<(String, Vec<SqlValue>)> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let mut parts = Vec::with_capacity(filters.len());
    let mut values = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = known_column(known, &filter.column)?;
        parts.push(format!("\"{column}\" {} ?", filter.op.as_sql()));
        values.push(json_to_sql(&filter.value));
    }
    Ok((format!(" WHERE {}", parts.join(" AND ")), values))
}

fn order_clause(request: &FetchRequest, known: &[String]) -> Result<String> {
    if request.order.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(request.order.len());
    for (name, direction) in &request.order {
        let column = known_column(known, name)?;
        parts.push(format!("\"{column}\" {}", direction.as_sql()));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

fn query_page(conn: &Connection, table: &str, request: &FetchRequest) -> Result<FetchResponse> {
    let known = table_columns(conn, table)?;
    let (where_sql, mut values) = where_clause(&request.filters, &known)?;
    let order_sql = order_clause(request, &known)?;

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM \"{table}\"{where_sql}"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    values.push(SqlValue::Integer(request.rows_to_return as i64));
    values.push(SqlValue::Integer(request.offset() as i64));
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM \"{table}\"{where_sql}{order_sql} LIMIT ? OFFSET ?"
    ))?;
    let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let mut cursor = stmt.query(params_from_iter(values.iter()))?;

    let mut rows = Vec::new();
    while let Some(row) = cursor.next()? {
        let mut record = Row::new();
        for (i, name) in names.iter().enumerate() {
            let value: SqlValue = row.get(i)?;
            record.insert(name.clone(), sql_to_json(value));
        }
        rows.push(record);
    }

    log::debug!(
        "sqlite {table}: {} of {total} rows at offset {}",
        rows.len(),
        request.offset()
    );
    Ok(FetchResponse {
        rows,
        total_count: total.max(0) as usize,
    })
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn sql_to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Number(i.into()),
        SqlValue::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}
