//! Relational-table sink.

use serde::{Deserialize, Serialize};
use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::Any;
use tracing::{debug, info};
use url::Url;

use crate::dataset::{ColumnType, Dataset, Value};
use crate::error::{Result, SifterError};

/// SQL backends the sink can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Backend named by a URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Backend named by a driver identifier, e.g. `mysql` or a JDBC class
    /// name such as `com.mysql.cj.jdbc.Driver`.
    pub fn from_driver(driver: &str) -> Option<Self> {
        let driver = driver.to_ascii_lowercase();
        if driver.contains("mysql") || driver.contains("mariadb") {
            Some(Dialect::MySql)
        } else if driver.contains("postgres") {
            Some(Dialect::Postgres)
        } else if driver.contains("sqlite") {
            Some(Dialect::Sqlite)
        } else {
            None
        }
    }

    /// Quote an identifier.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Placeholder for the 1-based parameter `n`.
    fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Most bind parameters allowed in one statement.
    fn max_params(&self) -> usize {
        match self {
            Dialect::Sqlite => 999,
            Dialect::MySql | Dialect::Postgres => 65_535,
        }
    }

    /// SQL type for a column.
    pub fn sql_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::String | ColumnType::Null => "TEXT",
        }
    }
}

/// Connection and target table for the relational sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Connection URL (`mysql://`, `postgres://`, `sqlite:`; a `jdbc:`
    /// prefix is accepted).
    pub url: String,
    /// Table to replace.
    pub table: String,
    /// User name, injected into the URL when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Password, injected into the URL when set. Never serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Driver identifier; must name the same backend as the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Rows per INSERT statement (capped by the backend's parameter limit).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    500
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: "jdbc:mysql://mysql-db:3306/starwars_db".to_string(),
            table: "starwars_cleaned".to_string(),
            user: Some("sparkuser".to_string()),
            password: None,
            driver: Some("com.mysql.cj.jdbc.Driver".to_string()),
            batch_size: default_batch_size(),
        }
    }
}

impl SinkConfig {
    /// Config for a URL and table with no credentials or driver.
    pub fn new(url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
            user: None,
            password: None,
            driver: None,
            batch_size: default_batch_size(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(SifterError::Config("Table name must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(SifterError::Config("Batch size must be at least 1".to_string()));
        }
        self.connection_url().map(|_| ())
    }

    /// Resolve the backend and the URL to connect with, credentials included.
    pub fn connection_url(&self) -> Result<(Dialect, String)> {
        let url = self.url.strip_prefix("jdbc:").unwrap_or(&self.url);

        let dialect = Dialect::from_url(url).ok_or_else(|| {
            SifterError::Config(format!("Unsupported database URL '{}'", self.url))
        })?;

        if let Some(driver) = &self.driver {
            match Dialect::from_driver(driver) {
                Some(d) if d == dialect => {}
                Some(d) => {
                    return Err(SifterError::Config(format!(
                        "Driver '{}' is for {:?} but the URL is for {:?}",
                        driver, d, dialect
                    )));
                }
                None => {
                    return Err(SifterError::Config(format!("Unknown driver '{}'", driver)));
                }
            }
        }

        if dialect == Dialect::Sqlite || (self.user.is_none() && self.password.is_none()) {
            return Ok((dialect, url.to_string()));
        }

        let mut parsed = Url::parse(url)?;
        if let Some(user) = &self.user {
            parsed
                .set_username(user)
                .map_err(|_| SifterError::Config(format!("Cannot set user on '{}'", url)))?;
        }
        if let Some(password) = &self.password {
            parsed
                .set_password(Some(password))
                .map_err(|_| SifterError::Config(format!("Cannot set password on '{}'", url)))?;
        }
        Ok((dialect, parsed.to_string()))
    }
}

/// Writes a dataset to a relational table, replacing the table.
#[derive(Debug, Clone)]
pub struct SqlSink {
    config: SinkConfig,
}

impl SqlSink {
    pub fn new(config: SinkConfig) -> Self {
        Self { config }
    }

    /// Drop and recreate the table, then insert every row in batches.
    /// Returns the number of rows inserted.
    ///
    /// The statements share one transaction. On Postgres and SQLite a failure
    /// leaves the previous table untouched. MySQL commits implicitly on
    /// `DROP TABLE` and `CREATE TABLE`, so there a failed batch leaves the
    /// new table partly filled.
    pub async fn write(&self, dataset: &Dataset) -> Result<u64> {
        self.config.validate()?;
        if dataset.column_count() == 0 {
            return Err(SifterError::Schema(
                "Cannot write a table without columns".to_string(),
            ));
        }

        let (dialect, url) = self.config.connection_url()?;
        sqlx::any::install_default_drivers();

        debug!(table = %self.config.table, dialect = ?dialect, "Connecting to database");
        let pool = AnyPoolOptions::new().max_connections(1).connect(&url).await?;
        let mut tx = pool.begin().await?;

        let table = dialect.quote(&self.config.table);
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(dialect, &table, dataset))
            .execute(&mut *tx)
            .await?;

        let types: Vec<ColumnType> = dataset.columns().iter().map(|c| c.column_type()).collect();
        let columns: Vec<String> = dataset
            .column_names()
            .iter()
            .map(|name| dialect.quote(name))
            .collect();
        let rows_per_batch = self
            .config
            .batch_size
            .min(dialect.max_params() / columns.len())
            .max(1);

        let mut inserted = 0u64;
        let rows: Vec<Vec<&Value>> = dataset.rows().collect();
        for batch in rows.chunks(rows_per_batch) {
            let sql = insert_sql(dialect, &table, &columns, batch.len());
            let mut query = sqlx::query(&sql);
            for row in batch {
                for (value, ty) in row.iter().zip(&types) {
                    query = bind_value(query, value, *ty);
                }
            }
            inserted += query.execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        pool.close().await;

        info!(table = %self.config.table, rows = inserted, "Wrote database table");
        Ok(inserted)
    }
}

fn create_table_sql(dialect: Dialect, table: &str, dataset: &Dataset) -> String {
    let columns: Vec<String> = dataset
        .columns()
        .iter()
        .map(|c| format!("{} {}", dialect.quote(&c.name), dialect.sql_type(c.column_type())))
        .collect();
    format!("CREATE TABLE {} ({})", table, columns.join(", "))
}

fn insert_sql(dialect: Dialect, table: &str, columns: &[String], rows: usize) -> String {
    let width = columns.len();
    let tuples: Vec<String> = (0..rows)
        .map(|r| {
            let params: Vec<String> = (0..width)
                .map(|c| dialect.placeholder(r * width + c + 1))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        columns.join(", "),
        tuples.join(", ")
    )
}

fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &Value,
    column_type: ColumnType,
) -> Query<'q, Any, AnyArguments<'q>> {
    match column_type {
        ColumnType::Integer => query.bind(match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }),
        ColumnType::Float => query.bind(match value {
            Value::Float(x) => Some(*x),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }),
        ColumnType::String | ColumnType::Null => query.bind(value.to_text()),
    }
}
