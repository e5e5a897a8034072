//! Core journal domain types.
//!
//! A trade is a bag of optional scalar fields plus its screenshot
//! slots. `TradeFields` is what the caller fills in on create,
//! `TradePatch` is the sparse field set for update, and `TradeFilter`
//! is the read-side projection used by `list`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::screenshots::ScreenshotSlots;
use crate::error::{JournalError, Result};

/// Store-assigned trade identifier.
pub type TradeId = i64;

// ────────────────────────────────────────────
// Enumerated fields
// ────────────────────────────────────────────

/// Market session the trade was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    London,
    #[serde(rename = "New York")]
    NewYork,
    Asian,
    Other,
}

impl Session {
    pub const ALL: [Self; 4] = [Self::London, Self::NewYork, Self::Asian, Self::Other];

    /// Label stored in the `session` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::London => "London",
            Self::NewYork => "New York",
            Self::Asian => "Asian",
            Self::Other => "Other",
        }
    }

    /// Label with separators removed, as matched when parsing.
    pub const fn key(self) -> &'static str {
        match self {
            Self::NewYork => "NewYork",
            other => other.as_str(),
        }
    }

    fn normalize(raw: &str) -> String {
        raw.chars().filter(|c| !matches!(c, ' ' | '-' | '_')).collect()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = Self::normalize(s);
        Self::ALL
            .into_iter()
            .find(|session| session.key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown session: {s}"))
    }
}

/// Whether the trade was real money, a backtest or a demo account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    #[default]
    Live,
    Backtest,
    Demo,
}

impl TradeType {
    pub const ALL: [Self; 3] = [Self::Live, Self::Backtest, Self::Demo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Backtest => "Backtest",
            Self::Demo => "Demo",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = String;

    /// Case-insensitive; the journal view historically upper-cased these.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tt| tt.as_str().eq_ignore_ascii_case(s.trim_matches(' ')))
            .ok_or_else(|| format!("unknown trade type: {s}"))
    }
}

// ────────────────────────────────────────────
// Records
// ────────────────────────────────────────────

/// Scalar fields of a trade as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeFields {
    pub date: Option<NaiveDate>,
    pub pair: Option<String>,
    pub session: Option<Session>,
    /// Free text, e.g. "09:30".
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    #[serde(default)]
    pub trade_type: TradeType,
    pub planned_rr: Option<f64>,
    pub realized_rr: Option<f64>,
    /// Signed; negative values are losses.
    pub profit_percent: Option<f64>,
    pub risk_per_trade: Option<f64>,
    pub notes: Option<String>,
    pub rights_wrongs: Option<String>,
}

impl TradeFields {
    /// Minimal record check: a trade needs a pair or a session.
    pub fn validate(&self) -> Result<()> {
        let has_pair = self.pair.as_deref().is_some_and(|p| !p.trim().is_empty());
        if has_pair || self.session.is_some() {
            Ok(())
        } else {
            Err(JournalError::validation(
                "a trade needs at least a pair or a session",
            ))
        }
    }
}

/// A persisted trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub id: TradeId,
    #[serde(flatten)]
    pub fields: TradeFields,
    pub screenshots: ScreenshotSlots,
    pub created_at: DateTime<Utc>,
}

// ────────────────────────────────────────────
// Update and query shapes
// ────────────────────────────────────────────

/// Sparse field set for `update`. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradePatch {
    pub date: Option<NaiveDate>,
    pub pair: Option<String>,
    pub session: Option<Session>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub trade_type: Option<TradeType>,
    pub planned_rr: Option<f64>,
    pub realized_rr: Option<f64>,
    pub profit_percent: Option<f64>,
    pub risk_per_trade: Option<f64>,
    pub notes: Option<String>,
    pub rights_wrongs: Option<String>,
}

impl TradePatch {
    /// Build a patch from loosely typed input, e.g. a submitted form.
    ///
    /// Keys outside the trade column allow-list are rejected rather
    /// than ignored.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| JournalError::validation(format!("invalid trade patch: {e}")))
    }

    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Read-side filter for `list`. Every criterion is optional; the date
/// range is inclusive at both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeFilter {
    pub pair: Option<String>,
    pub session: Option<Session>,
    pub trade_type: Option<TradeType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TradeFilter {
    #[must_use]
    pub fn pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = Some(pair.into());
        self
    }

    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn trade_type(mut self, trade_type: TradeType) -> Self {
        self.trade_type = Some(trade_type);
        self
    }

    #[must_use]
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// In-memory equivalent of the SQL predicate.
    pub fn matches(&self, trade: &Trade) -> bool {
        let f = &trade.fields;
        if self.pair.is_some() && f.pair != self.pair {
            return false;
        }
        if self.session.is_some() && f.session != self.session {
            return false;
        }
        if self.trade_type.is_some_and(|tt| tt != f.trade_type) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = f.date else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trade_on(date: NaiveDate) -> Trade {
        Trade {
            id: 1,
            fields: TradeFields {
                date: Some(date),
                pair: Some("EURUSD".to_string()),
                session: Some(Session::London),
                ..TradeFields::default()
            },
            screenshots: ScreenshotSlots::empty(),
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_session_labels() {
        assert_eq!("New York".parse::<Session>().unwrap(), Session::NewYork);
        assert_eq!("newyork".parse::<Session>().unwrap(), Session::NewYork);
        assert_eq!("LONDON".parse::<Session>().unwrap(), Session::London);
        assert_eq!("new-york".parse::<Session>().unwrap(), Session::NewYork);
        assert_eq!(" asian ".parse::<Session>().unwrap(), Session::Asian);
        assert!("Sydney".parse::<Session>().is_err());
        assert_eq!(Session::NewYork.key(), "NewYork");
        assert_eq!(Session::NewYork.to_string(), "New York");
    }

    #[test]
    fn test_trade_type_case_insensitive() {
        assert_eq!("BACKTEST".parse::<TradeType>().unwrap(), TradeType::Backtest);
        assert_eq!(TradeType::default(), TradeType::Live);
    }

    #[test]
    fn test_validate_needs_pair_or_session() {
        assert!(TradeFields::default().validate().is_err());
        let blank = TradeFields {
            pair: Some("   ".to_string()),
            ..TradeFields::default()
        };
        assert!(matches!(blank.validate(), Err(JournalError::Validation(_))));
        let pair_only = TradeFields {
            pair: Some("XAUUSD".to_string()),
            ..TradeFields::default()
        };
        assert!(pair_only.validate().is_ok());
        let session_only = TradeFields {
            session: Some(Session::Asian),
            ..TradeFields::default()
        };
        assert!(session_only.validate().is_ok());
    }

    #[test]
    fn test_patch_from_json_rejects_unknown_keys() {
        let err = TradePatch::from_json(json!({"pair": "GBPUSD", "id": 4})).unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));

        let patch = TradePatch::from_json(json!({
            "profit_percent": -2.0,
            "session": "New York",
            "date": "2024-03-05"
        }))
        .unwrap();
        assert_eq!(patch.profit_percent, Some(-2.0));
        assert_eq!(patch.session, Some(Session::NewYork));
        assert_eq!(patch.date, Some(day(5)));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TradePatch::default().is_empty());
        let patch = TradePatch {
            realized_rr: Some(1.8),
            ..TradePatch::default()
        };
        assert!(!patch.is_empty());
        assert!(TradePatch::from_json(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_filter_date_range_inclusive() {
        let filter = TradeFilter::default().between(day(2), day(4));
        assert!(!filter.matches(&trade_on(day(1))));
        assert!(filter.matches(&trade_on(day(2))));
        assert!(filter.matches(&trade_on(day(4))));
        assert!(!filter.matches(&trade_on(day(5))));
    }

    #[test]
    fn test_filter_exact_fields() {
        let t = trade_on(day(1));
        assert!(TradeFilter::default().pair("EURUSD").matches(&t));
        assert!(!TradeFilter::default().pair("eurusd").matches(&t));
        assert!(!TradeFilter::default().session(Session::Asian).matches(&t));
        assert!(TradeFilter::default().trade_type(TradeType::Live).matches(&t));
    }
}
