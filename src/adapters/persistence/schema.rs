//! Trades table definition and additive column list.
//!
//! `CREATE_TABLE` is the current revision. Databases created by older
//! revisions are brought forward by adding whatever entry of `COLUMNS`
//! they lack. Columns are never dropped or renamed.

/// Table holding one row per trade.
pub const TABLE: &str = "trades";

/// Current table definition.
pub const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS trades (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    date            TEXT,
    pair            TEXT,
    session         TEXT,
    entry_time      TEXT,
    exit_time       TEXT,
    trade_type      TEXT DEFAULT 'Live',
    planned_rr      REAL,
    realized_rr     REAL,
    profit_percent  REAL,
    risk_per_trade  REAL,
    notes           TEXT,
    rights_wrongs   TEXT,
    screenshots     TEXT,
    created_at      TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

/// Index backing the default newest-first ordering and date filters.
pub const CREATE_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_trades_date ON trades (date DESC, created_at DESC)";

/// Every non-key column with the declaration used when it has to be
/// added to an existing table. SQLite rejects non-constant defaults in
/// `ALTER TABLE ADD COLUMN`, so `created_at` is added bare.
pub const COLUMNS: &[(&str, &str)] = &[
    ("date", "TEXT"),
    ("pair", "TEXT"),
    ("session", "TEXT"),
    ("entry_time", "TEXT"),
    ("exit_time", "TEXT"),
    ("trade_type", "TEXT DEFAULT 'Live'"),
    ("planned_rr", "REAL"),
    ("realized_rr", "REAL"),
    ("profit_percent", "REAL"),
    ("risk_per_trade", "REAL"),
    ("notes", "TEXT"),
    ("rights_wrongs", "TEXT"),
    ("screenshots", "TEXT"),
    ("created_at", "TEXT"),
];

/// Column list for reads. Date-like columns are cast so legacy
/// declared types decode as text.
pub const SELECT_COLUMNS: &str = "\
id, CAST(date AS TEXT) AS date, pair, session, entry_time, exit_time, trade_type, \
planned_rr, realized_rr, profit_percent, risk_per_trade, notes, rights_wrongs, \
screenshots, CAST(created_at AS TEXT) AS created_at";

/// `session` with the separators `Session::from_str` ignores removed.
/// Compare with `COLLATE NOCASE` against `Session::key`.
pub const SESSION_KEY: &str =
    "REPLACE(REPLACE(REPLACE(session, ' ', ''), '-', ''), '_', '')";

/// `trade_type` as it decodes: known labels in any case, anything else
/// (including NULL) as `Live`.
pub const TRADE_TYPE_LABEL: &str = "CASE lower(trim(trade_type)) \
WHEN 'backtest' THEN 'Backtest' WHEN 'demo' THEN 'Demo' ELSE 'Live' END";

/// Default ordering for `list`.
pub const ORDER_NEWEST_FIRST: &str = " ORDER BY date DESC, created_at DESC, id DESC";

/// `ALTER TABLE` statement adding one column.
pub fn add_column_sql(name: &str, decl: &str) -> String {
    format!("ALTER TABLE {TABLE} ADD COLUMN {name} {decl}")
}
