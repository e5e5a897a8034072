//! SQLite Trade Store - Concrete Adapter for the TradeStore Port
//!
//! Persists trades in a single `trades` table through an injected
//! sqlx connection pool. Updates are built from the typed
//! `TradePatch`, so only known columns can ever appear in a `SET`
//! clause and only the fields that are present get written.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::row::{TradeRow, format_date, format_timestamp};
use super::schema;
use crate::domain::{ScreenshotSlots, Trade, TradeFields, TradeFilter, TradeId, TradePatch};
use crate::error::Result;
use crate::ports::repository::TradeStore;

/// sqlx-backed trade store.
#[derive(Debug, Clone)]
pub struct SqliteTradeStore {
    pool: SqlitePool,
}

impl SqliteTradeStore {
    /// Wrap an existing pool.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url`.
    ///
    /// `url` is a sqlx SQLite URL such as `sqlite://data/trades.db`.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the
    /// pool is pinned to one connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Underlying pool, for callers that need raw access.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Names of the columns currently present on the trades table.
    async fn existing_columns(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("PRAGMA table_info(trades)")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Into::into))
            .collect()
    }
}

/// Append the `WHERE` clause for `filter` to `qb`.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TradeFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(pair) = &filter.pair {
        qb.push(" AND pair = ").push_bind(pair.clone());
    }
    if let Some(session) = filter.session {
        qb.push(" AND ")
            .push(schema::SESSION_KEY)
            .push(" = ")
            .push_bind(session.key())
            .push(" COLLATE NOCASE");
    }
    if let Some(trade_type) = filter.trade_type {
        qb.push(" AND ")
            .push(schema::TRADE_TYPE_LABEL)
            .push(" = ")
            .push_bind(trade_type.as_str());
    }
    if let Some(from) = filter.from {
        qb.push(" AND date(date) >= ").push_bind(format_date(from));
    }
    if let Some(to) = filter.to {
        qb.push(" AND date(date) <= ").push_bind(format_date(to));
    }
}

/// Append `col = ?` pairs for every present field. Returns how many
/// assignments were pushed.
fn push_assignments(
    qb: &mut QueryBuilder<'_, Sqlite>,
    patch: &TradePatch,
    screenshots: Option<String>,
) -> usize {
    let mut count = 0usize;
    let mut set = qb.separated(", ");

    macro_rules! assign {
        ($col:literal, $value:expr) => {
            if let Some(value) = $value {
                set.push(concat!($col, " = ")).push_bind_unseparated(value);
                count += 1;
            }
        };
    }

    assign!("date", patch.date.map(format_date));
    assign!("pair", patch.pair.clone());
    assign!("session", patch.session.map(|s| s.as_str()));
    assign!("entry_time", patch.entry_time.clone());
    assign!("exit_time", patch.exit_time.clone());
    assign!("trade_type", patch.trade_type.map(|t| t.as_str()));
    assign!("planned_rr", patch.planned_rr);
    assign!("realized_rr", patch.realized_rr);
    assign!("profit_percent", patch.profit_percent);
    assign!("risk_per_trade", patch.risk_per_trade);
    assign!("notes", patch.notes.clone());
    assign!("rights_wrongs", patch.rights_wrongs.clone());
    assign!("screenshots", screenshots);

    count
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(schema::CREATE_TABLE).execute(&self.pool).await?;

        let existing = self.existing_columns().await?;
        for (name, decl) in schema::COLUMNS {
            if existing.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                continue;
            }
            sqlx::query(&schema::add_column_sql(name, decl))
                .execute(&self.pool)
                .await?;
            info!(column = name, "Added missing trades column");
        }

        sqlx::query(schema::CREATE_DATE_INDEX)
            .execute(&self.pool)
            .await?;

        debug!("Trades schema ready");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn migrate_legacy_screenshots(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        // Map-form rows are the common case; skip them in SQL.
        let rows = sqlx::query(
            "SELECT id, screenshots FROM trades \
             WHERE screenshots IS NOT NULL AND ltrim(screenshots) NOT LIKE '{%'",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut migrated = 0u64;
        for row in rows {
            let id: TradeId = row.try_get("id")?;
            let raw: String = row.try_get("screenshots")?;
            if !ScreenshotSlots::is_legacy_column(&raw) {
                continue;
            }
            let Ok(slots) = ScreenshotSlots::from_column(&raw) else {
                tracing::warn!(trade_id = id, "Skipping unreadable legacy screenshots");
                continue;
            };
            sqlx::query("UPDATE trades SET screenshots = ? WHERE id = ?")
                .bind(slots.to_column()?)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            migrated += 1;
        }

        tx.commit().await?;

        if migrated > 0 {
            info!(rows = migrated, "Migrated legacy screenshot lists");
        }
        Ok(migrated)
    }

    #[instrument(skip_all, fields(pair = ?fields.pair))]
    async fn insert(&self, fields: &TradeFields, screenshots: &ScreenshotSlots) -> Result<TradeId> {
        let result = sqlx::query(
            "INSERT INTO trades (\
                date, pair, session, entry_time, exit_time, trade_type, \
                planned_rr, realized_rr, profit_percent, risk_per_trade, \
                notes, rights_wrongs, screenshots, created_at\
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(fields.date.map(format_date))
        .bind(fields.pair.as_deref())
        .bind(fields.session.map(|s| s.as_str()))
        .bind(fields.entry_time.as_deref())
        .bind(fields.exit_time.as_deref())
        .bind(fields.trade_type.as_str())
        .bind(fields.planned_rr)
        .bind(fields.realized_rr)
        .bind(fields.profit_percent)
        .bind(fields.risk_per_trade)
        .bind(fields.notes.as_deref())
        .bind(fields.rights_wrongs.as_deref())
        .bind(screenshots.to_column()?)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(trade_id = id, "Trade row inserted");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &TradeFilter) -> Result<Vec<Trade>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM {}",
            schema::SELECT_COLUMNS,
            schema::TABLE
        ));
        push_filter(&mut qb, filter);
        qb.push(schema::ORDER_NEWEST_FIRST);

        let rows = qb
            .build_query_as::<TradeRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!(count = rows.len(), "Trades listed");
        Ok(rows.into_iter().map(Trade::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: TradeId) -> Result<Option<Trade>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            schema::SELECT_COLUMNS,
            schema::TABLE
        );
        let row = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Trade::from))
    }

    #[instrument(skip(self, patch, screenshots))]
    async fn update(
        &self,
        id: TradeId,
        patch: &TradePatch,
        screenshots: Option<&ScreenshotSlots>,
    ) -> Result<u64> {
        let screenshots = screenshots.map(ScreenshotSlots::to_column).transpose()?;

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE trades SET ");
        if push_assignments(&mut qb, patch, screenshots) == 0 {
            debug!("Nothing to update");
            return Ok(0);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        debug!(rows = affected, "Trade row updated");
        Ok(affected)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: TradeId) -> Result<u64> {
        let affected = sqlx::query("DELETE FROM trades WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Session, TradeType};

    async fn store() -> SqliteTradeStore {
        let store = SqliteTradeStore::in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn fields(pair: &str, date: &str) -> TradeFields {
        TradeFields {
            pair: Some(pair.to_string()),
            session: Some(Session::London),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            ..TradeFields::default()
        }
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let store = store().await;
        store.ensure_schema().await.unwrap();
        let columns = store.existing_columns().await.unwrap();
        assert_eq!(columns.len(), schema::COLUMNS.len() + 1);
    }

    #[tokio::test]
    async fn test_ensure_schema_adds_missing_columns() {
        let store = SqliteTradeStore::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE trades (id INTEGER PRIMARY KEY, date DATE, pair TEXT, \
             session TEXT, profit_percent FLOAT, screenshots TEXT, \
             created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)",
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO trades (date, pair, session, profit_percent, screenshots) \
             VALUES ('2024-01-02', 'EURUSD', 'London', 1.5, '[\"a.png\"]')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        store.ensure_schema().await.unwrap();
        let columns = store.existing_columns().await.unwrap();
        assert!(columns.iter().any(|c| c == "risk_per_trade"));
        assert!(columns.iter().any(|c| c == "rights_wrongs"));

        let trades = store.list(&TradeFilter::default()).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].fields.profit_percent, Some(1.5));
        assert_eq!(trades[0].screenshots.filled(), 1);
    }

    #[tokio::test]
    async fn test_migrate_legacy_screenshots() {
        let store = store().await;
        sqlx::query("INSERT INTO trades (pair, screenshots) VALUES ('EURUSD', '[\"d.png\", \"h4.png\"]')")
            .execute(store.pool())
            .await
            .unwrap();

        assert_eq!(store.migrate_legacy_screenshots().await.unwrap(), 1);
        assert_eq!(store.migrate_legacy_screenshots().await.unwrap(), 0);

        let raw: String = sqlx::query_scalar("SELECT screenshots FROM trades")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert!(raw.starts_with('{'));
        assert!(raw.contains(r#""h4":"h4.png""#));
    }

    #[tokio::test]
    async fn test_migrate_double_encoded_screenshots() {
        let store = store().await;
        sqlx::query("INSERT INTO trades (pair, screenshots) VALUES ('EURUSD', ?)")
            .bind(r#""[\"d.png\",\"h4.png\"]""#)
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO trades (pair, screenshots) VALUES ('GBPUSD', ?)")
            .bind(ScreenshotSlots::empty().to_column().unwrap())
            .execute(store.pool())
            .await
            .unwrap();

        // Readable before migration.
        let before = store
            .list(&TradeFilter::default().pair("EURUSD"))
            .await
            .unwrap();
        assert_eq!(before[0].screenshots.filled(), 2);

        assert_eq!(store.migrate_legacy_screenshots().await.unwrap(), 1);
        assert_eq!(store.migrate_legacy_screenshots().await.unwrap(), 0);

        let raw: String =
            sqlx::query_scalar("SELECT screenshots FROM trades WHERE pair = 'EURUSD'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert!(raw.starts_with('{'));
        assert!(raw.contains(r#""daily":"d.png""#));
        assert!(raw.contains(r#""h4":"h4.png""#));
    }

    #[tokio::test]
    async fn test_filters_match_decoded_labels() {
        let store = store().await;
        for (session, trade_type) in [
            ("london", "LIVE"),
            ("newyork", "backtest"),
            ("New York", "Demo"),
            ("new-york", "paper"),
            ("Sydney", "demo"),
        ] {
            sqlx::query(
                "INSERT INTO trades (pair, session, trade_type, screenshots) \
                 VALUES ('EURUSD', ?, ?, NULL)",
            )
            .bind(session)
            .bind(trade_type)
            .execute(store.pool())
            .await
            .unwrap();
        }
        sqlx::query("INSERT INTO trades (pair, session, trade_type) VALUES ('EURUSD', NULL, NULL)")
            .execute(store.pool())
            .await
            .unwrap();

        let all = store.list(&TradeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 6);

        let mut filters: Vec<TradeFilter> = Session::ALL
            .into_iter()
            .map(|s| TradeFilter::default().session(s))
            .collect();
        filters.extend(
            TradeType::ALL
                .into_iter()
                .map(|t| TradeFilter::default().trade_type(t)),
        );

        for filter in &filters {
            let mut listed: Vec<TradeId> = store
                .list(filter)
                .await
                .unwrap()
                .iter()
                .map(|t| t.id)
                .collect();
            let mut expected: Vec<TradeId> =
                all.iter().filter(|t| filter.matches(t)).map(|t| t.id).collect();
            listed.sort_unstable();
            expected.sort_unstable();
            assert_eq!(listed, expected, "{filter:?}");
        }

        let london = store
            .list(&TradeFilter::default().session(Session::London))
            .await
            .unwrap();
        assert_eq!(london.len(), 1);
        let new_york = store
            .list(&TradeFilter::default().session(Session::NewYork))
            .await
            .unwrap();
        assert_eq!(new_york.len(), 3);
        let live = store
            .list(&TradeFilter::default().trade_type(TradeType::Live))
            .await
            .unwrap();
        assert_eq!(live.len(), 3);
    }

    #[tokio::test]
    async fn test_update_writes_only_present_fields() {
        let store = store().await;
        let mut input = fields("EURUSD", "2024-01-02");
        input.notes = Some("initial".to_string());
        let id = store.insert(&input, &ScreenshotSlots::empty()).await.unwrap();

        let patch = TradePatch {
            profit_percent: Some(-0.75),
            ..TradePatch::default()
        };
        assert_eq!(store.update(id, &patch, None).await.unwrap(), 1);

        let trade = store.fetch_by_id(id).await.unwrap().unwrap();
        assert_eq!(trade.fields.profit_percent, Some(-0.75));
        assert_eq!(trade.fields.notes.as_deref(), Some("initial"));
    }

    #[tokio::test]
    async fn test_update_empty_patch_and_unknown_id() {
        let store = store().await;
        let id = store
            .insert(&fields("EURUSD", "2024-01-02"), &ScreenshotSlots::empty())
            .await
            .unwrap();
        assert_eq!(store.update(id, &TradePatch::default(), None).await.unwrap(), 0);

        let patch = TradePatch {
            notes: Some("x".to_string()),
            ..TradePatch::default()
        };
        assert_eq!(store.update(id + 100, &patch, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let store = store().await;
        for (pair, date) in [
            ("EURUSD", "2024-01-03"),
            ("GBPUSD", "2024-01-05"),
            ("EURUSD", "2024-01-04"),
        ] {
            store
                .insert(&fields(pair, date), &ScreenshotSlots::empty())
                .await
                .unwrap();
        }

        let all = store.list(&TradeFilter::default()).await.unwrap();
        let dates: Vec<_> = all.iter().map(|t| t.fields.date.unwrap().to_string()).collect();
        assert_eq!(dates, ["2024-01-05", "2024-01-04", "2024-01-03"]);

        let eur = store
            .list(&TradeFilter::default().pair("EURUSD"))
            .await
            .unwrap();
        assert_eq!(eur.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_reports_rows() {
        let store = store().await;
        let id = store
            .insert(&fields("EURUSD", "2024-01-02"), &ScreenshotSlots::empty())
            .await
            .unwrap();
        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert_eq!(store.delete(id).await.unwrap(), 0);
        assert!(store.fetch_by_id(id).await.unwrap().is_none());
        assert!(store.is_healthy().await);
    }
}
