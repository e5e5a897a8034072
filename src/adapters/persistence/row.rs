//! Row model for the trades table and its conversion into `Trade`.
//!
//! Decoding is lenient: the table has been written by several app
//! revisions, so unparseable enum labels, dates or screenshot columns
//! degrade to empty values with a warning instead of failing the read.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use sqlx::FromRow;
use tracing::warn;

use crate::domain::{ScreenshotSlots, Session, Trade, TradeFields, TradeId, TradeType};

/// Raw trades row as selected with `schema::SELECT_COLUMNS`.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub id: TradeId,
    pub date: Option<String>,
    pub pair: Option<String>,
    pub session: Option<String>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub trade_type: Option<String>,
    pub planned_rr: Option<f64>,
    pub realized_rr: Option<f64>,
    pub profit_percent: Option<f64>,
    pub risk_per_trade: Option<f64>,
    pub notes: Option<String>,
    pub rights_wrongs: Option<String>,
    pub screenshots: Option<String>,
    pub created_at: Option<String>,
}

impl From<TradeRow> for Trade {
    fn from(row: TradeRow) -> Self {
        let id = row.id;

        let session = row.session.as_deref().and_then(|raw| {
            raw.parse::<Session>()
                .map_err(|e| warn!(trade_id = id, error = %e, "Unreadable session, leaving empty"))
                .ok()
        });

        let trade_type = row
            .trade_type
            .as_deref()
            .and_then(|raw| {
                raw.parse::<TradeType>()
                    .map_err(|e| warn!(trade_id = id, error = %e, "Unreadable trade type, using default"))
                    .ok()
            })
            .unwrap_or_default();

        let date = row.date.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(trade_id = id, raw, "Unreadable trade date, leaving empty");
            }
            parsed
        });

        let screenshots = match row.screenshots.as_deref() {
            None => ScreenshotSlots::empty(),
            Some(raw) => ScreenshotSlots::from_column(raw).unwrap_or_else(|e| {
                warn!(trade_id = id, error = %e, "Corrupt screenshots column, showing none");
                ScreenshotSlots::empty()
            }),
        };

        let created_at = row
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_default();

        Self {
            id,
            fields: TradeFields {
                date,
                pair: row.pair,
                session,
                entry_time: row.entry_time,
                exit_time: row.exit_time,
                trade_type,
                planned_rr: row.planned_rr,
                realized_rr: row.realized_rr,
                profit_percent: row.profit_percent,
                risk_per_trade: row.risk_per_trade,
                notes: row.notes,
                rights_wrongs: row.rights_wrongs,
            },
            screenshots,
            created_at,
        }
    }
}

/// Column text for a date.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Column text for a creation timestamp. Fixed width so text order
/// matches time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored date. Accepts a bare date or a date with a time part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parse a stored timestamp (RFC 3339 or SQLite's `YYYY-MM-DD HH:MM:SS`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;
    use crate::domain::{AssetReference, Timeframe};

    fn raw_row() -> TradeRow {
        TradeRow {
            id: 7,
            date: Some("2024-03-05".to_string()),
            pair: Some("GBPJPY".to_string()),
            session: Some("New York".to_string()),
            entry_time: Some("14:30".to_string()),
            exit_time: None,
            trade_type: Some("BACKTEST".to_string()),
            planned_rr: Some(3.0),
            realized_rr: Some(-1.0),
            profit_percent: Some(-0.5),
            risk_per_trade: None,
            notes: None,
            rights_wrongs: Some("moved stop".to_string()),
            screenshots: Some(r#"["d.png", null, "h1.png"]"#.to_string()),
            created_at: Some("2024-03-05 14:31:02".to_string()),
        }
    }

    #[test]
    fn test_row_into_trade() {
        let trade = Trade::from(raw_row());
        assert_eq!(trade.id, 7);
        assert_eq!(trade.fields.session, Some(Session::NewYork));
        assert_eq!(trade.fields.trade_type, TradeType::Backtest);
        assert_eq!(trade.fields.profit_percent, Some(-0.5));
        assert_eq!(
            trade.screenshots.get(Timeframe::H1),
            Some(&AssetReference::Path("h1.png".into()))
        );
        assert!(trade.screenshots.get(Timeframe::H4).is_none());
        assert_eq!(trade.created_at.hour(), 14);
    }

    #[test]
    fn test_row_with_garbage_degrades() {
        let mut row = raw_row();
        row.session = Some("Sydney".to_string());
        row.trade_type = None;
        row.date = Some("yesterday".to_string());
        row.screenshots = Some("{broken".to_string());
        let trade = Trade::from(row);
        assert_eq!(trade.fields.session, None);
        assert_eq!(trade.fields.trade_type, TradeType::Live);
        assert_eq!(trade.fields.date, None);
        assert_eq!(trade.screenshots, ScreenshotSlots::empty());
    }

    #[test]
    fn test_parse_date_with_time_part() {
        let date = parse_date("2024-03-05 00:00:00").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 5));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
        assert!(parse_timestamp("2024-03-05T10:00:00.123Z").is_some());
        assert!(parse_timestamp("nope").is_none());
    }
}
