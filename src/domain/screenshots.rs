//! Screenshot slots - one optional asset reference per chart timeframe.
//!
//! The slot map always holds every timeframe; an empty slot is an
//! explicit `None`. The `screenshots` column stores it as a JSON object.
//! Early journal revisions stored a positional JSON array instead
//! (`daily, h4, h1, m15, m5`), which is still accepted on read.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::asset::AssetReference;

/// Chart timeframe a screenshot was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    H4,
    H1,
    M15,
    M5,
    /// Chart after the trade closed.
    Outcome,
}

impl Timeframe {
    /// Every timeframe, in display order.
    pub const ALL: [Self; 6] = [
        Self::Daily,
        Self::H4,
        Self::H1,
        Self::M15,
        Self::M5,
        Self::Outcome,
    ];

    /// Positional order of the legacy array column.
    const LEGACY_ORDER: [Self; 5] = [Self::Daily, Self::H4, Self::H1, Self::M15, Self::M5];

    /// Column key for this timeframe.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::H4 => "h4",
            Self::H1 => "h1",
            Self::M15 => "m15",
            Self::M5 => "m5",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown timeframe: {s}"))
    }
}

/// Full timeframe → reference map of a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenshotSlots(BTreeMap<Timeframe, Option<AssetReference>>);

/// Stored shapes of the `screenshots` column.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnRepr {
    Map(BTreeMap<String, Option<AssetReference>>),
    Legacy(Vec<Option<AssetReference>>),
    /// Either form serialized a second time into a JSON string.
    Encoded(String),
}

impl ScreenshotSlots {
    /// All slots empty.
    pub fn empty() -> Self {
        Self(Timeframe::ALL.into_iter().map(|tf| (tf, None)).collect())
    }

    /// Reference stored for `timeframe`.
    pub fn get(&self, timeframe: Timeframe) -> Option<&AssetReference> {
        self.0.get(&timeframe).and_then(Option::as_ref)
    }

    /// Put `reference` into a slot, returning whatever it held before.
    pub fn set(
        &mut self,
        timeframe: Timeframe,
        reference: Option<AssetReference>,
    ) -> Option<AssetReference> {
        self.0.insert(timeframe, reference).flatten()
    }

    /// Slots in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Timeframe, Option<&AssetReference>)> {
        self.0.iter().map(|(tf, r)| (*tf, r.as_ref()))
    }

    /// Every non-null reference.
    pub fn references(&self) -> impl Iterator<Item = &AssetReference> {
        self.0.values().filter_map(Option::as_ref)
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        self.references().count()
    }

    /// Serialize for the `screenshots` column.
    pub fn to_column(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a `screenshots` column value.
    ///
    /// Accepts the map form, the legacy positional array, and either of
    /// those wrapped in a JSON string (older rows were encoded twice).
    /// Unknown keys are dropped and missing keys come back as empty slots.
    pub fn from_column(raw: &str) -> serde_json::Result<Self> {
        let mut slots = Self::empty();
        if raw.trim().is_empty() {
            return Ok(slots);
        }
        match serde_json::from_str::<ColumnRepr>(raw)? {
            ColumnRepr::Map(map) => {
                for (key, reference) in map {
                    if let Ok(tf) = key.parse::<Timeframe>() {
                        slots.set(tf, reference);
                    }
                }
            }
            ColumnRepr::Legacy(list) => {
                for (tf, reference) in Timeframe::LEGACY_ORDER.into_iter().zip(list) {
                    slots.set(tf, reference);
                }
            }
            ColumnRepr::Encoded(inner) => return Self::from_column(&inner),
        }
        Ok(slots)
    }

    /// Whether a raw column value is in a legacy form: a positional
    /// array, or anything double-encoded as a JSON string.
    pub fn is_legacy_column(raw: &str) -> bool {
        let raw = raw.trim_start();
        raw.starts_with('[') || raw.starts_with('"')
    }
}

impl Default for ScreenshotSlots {
    fn default() -> Self {
        Self::empty()
    }
}

/// New screenshot payloads for `create`, keyed by timeframe.
pub type ScreenshotUploads = BTreeMap<Timeframe, Vec<u8>>;

/// Requested change to one slot during `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChange {
    /// Store a new payload, superseding the current one.
    Replace(Vec<u8>),
    /// Empty the slot and purge its asset.
    Clear,
}

/// Per-timeframe slot changes for `update`. Omitted slots are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenshotChanges(BTreeMap<Timeframe, SlotChange>);

impl ScreenshotChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `timeframe` with `bytes`. An empty payload means no file
    /// was supplied, so the slot is left alone.
    #[must_use]
    pub fn replace(mut self, timeframe: Timeframe, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        if !bytes.is_empty() {
            self.0.insert(timeframe, SlotChange::Replace(bytes));
        }
        self
    }

    /// Clear `timeframe`.
    #[must_use]
    pub fn clear(mut self, timeframe: Timeframe) -> Self {
        self.0.insert(timeframe, SlotChange::Clear);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timeframe, &SlotChange)> {
        self.0.iter().map(|(tf, change)| (*tf, change))
    }
}

impl From<ScreenshotUploads> for ScreenshotChanges {
    fn from(uploads: ScreenshotUploads) -> Self {
        uploads
            .into_iter()
            .fold(Self::new(), |changes, (tf, bytes)| changes.replace(tf, bytes))
    }
}
