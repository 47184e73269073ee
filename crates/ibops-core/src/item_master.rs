//! Item master: item number -> unit cubic volume.
//!
//! Built once per session from the external JSON resource and read-only
//! afterwards. Lookups try an ordered list of key strategies and stop at the
//! first hit; every attempt is recorded so misses can be diagnosed.

use crate::error::IbopsError;
use crate::model::{CellValue, ItemRef};
use crate::parsing::values::{cell_decimal, decimal_key};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One record of the item master resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMasterRecord {
    #[serde(rename = "ITEM_NUMBER")]
    pub item_number: CellValue,
    #[serde(rename = "CUBIC_VOL", default)]
    pub cubic_vol: CellValue,
}

/// The resource ships either as a workbook dump (`{"Sheet1": [...]}`) or as a
/// bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemMasterDocument {
    Rows(Vec<ItemMasterRecord>),
    Sheets(BTreeMap<String, Vec<ItemMasterRecord>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMasterEntry {
    pub item_number: i64,
    /// `None` when the resource value is not numeric.
    pub cubic_volume: Option<Decimal>,
}

impl ItemMasterEntry {
    /// Cubic volume, if it is a positive number.
    pub fn valid_volume(&self) -> Option<Decimal> {
        self.cubic_volume.filter(|v| *v > Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// The raw value read as a positive number.
    Direct,
    /// The raw value's text, untouched.
    Str,
    /// Floor of the raw value read as a number.
    Floor,
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStrategy::Direct => write!(f, "direct"),
            LookupStrategy::Str => write!(f, "string"),
            LookupStrategy::Floor => write!(f, "floor"),
        }
    }
}

/// Strategies in evaluation order. First hit wins.
pub const LOOKUP_ORDER: [LookupStrategy; 3] = [
    LookupStrategy::Direct,
    LookupStrategy::Str,
    LookupStrategy::Floor,
];

impl LookupStrategy {
    /// Key this strategy derives from a raw item value, if any.
    pub fn key_for(self, raw: &CellValue) -> Option<String> {
        match self {
            LookupStrategy::Direct => cell_decimal(raw)
                .filter(|d| *d > Decimal::ZERO)
                .map(decimal_key),
            LookupStrategy::Str => {
                let s = raw.to_string();
                (!s.is_empty()).then_some(s)
            }
            LookupStrategy::Floor => cell_decimal(raw)
                .map(|d| d.floor())
                .filter(|d| *d > Decimal::ZERO)
                .map(decimal_key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupAttempt {
    pub strategy: LookupStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    NotFound,
    /// Entry exists but its cubic volume is missing, zero or negative.
    InvalidVolume,
}

/// A failed lookup with every key that was tried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupMiss {
    pub item: String,
    pub reason: MissReason,
    pub attempts: Vec<LookupAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemHit<'a> {
    pub entry: &'a ItemMasterEntry,
    pub cubic_volume: Decimal,
    pub strategy: LookupStrategy,
    pub attempts: Vec<LookupAttempt>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemMaster {
    entries: BTreeMap<String, ItemMasterEntry>,
    skipped_records: usize,
}

impl ItemMaster {
    /// Index records by the floor of their numeric item number. Records
    /// without a numeric item number are skipped and counted; later
    /// duplicates replace earlier ones.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ItemMasterRecord>,
    {
        let mut master = ItemMaster::default();
        for record in records {
            let number = cell_decimal(&record.item_number)
                .map(|d| d.floor())
                .and_then(|d| rust_decimal::prelude::ToPrimitive::to_i64(&d));
            let Some(item_number) = number else {
                master.skipped_records += 1;
                continue;
            };
            master.entries.insert(
                item_number.to_string(),
                ItemMasterEntry {
                    item_number,
                    cubic_volume: cell_decimal(&record.cubic_vol),
                },
            );
        }
        master
    }

    /// Parse the item master resource.
    pub fn from_json(json: &str) -> Result<Self, IbopsError> {
        let doc: ItemMasterDocument = serde_json::from_str(json)
            .map_err(|e| IbopsError::ItemMasterLoad(e.to_string()))?;
        let records = match doc {
            ItemMasterDocument::Rows(rows) => rows,
            ItemMasterDocument::Sheets(mut sheets) => match sheets.remove("Sheet1") {
                Some(rows) => rows,
                None => sheets.into_values().next().ok_or_else(|| {
                    IbopsError::ItemMasterLoad("item master document has no sheets".into())
                })?,
            },
        };
        let master = Self::from_records(records);
        if master.is_empty() {
            return Err(IbopsError::ItemMasterLoad(
                "item master contains no usable records".into(),
            ));
        }
        tracing::info!(
            items = master.len(),
            skipped = master.skipped_records,
            "loaded item master"
        );
        Ok(master)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records dropped at load time for lack of a numeric item number.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn get(&self, item_number: i64) -> Option<&ItemMasterEntry> {
        self.entries.get(&item_number.to_string())
    }

    /// Resolve an item reference to its cubic volume.
    pub fn lookup(&self, item: &ItemRef) -> Result<ItemHit<'_>, LookupMiss> {
        let mut attempts = Vec::with_capacity(LOOKUP_ORDER.len());

        for strategy in LOOKUP_ORDER {
            let key = strategy.key_for(&item.raw);
            let found = key.as_ref().and_then(|k| self.entries.get(k));
            attempts.push(LookupAttempt {
                strategy,
                key: key.clone(),
                hit: found.is_some(),
            });

            let Some(entry) = found else {
                continue;
            };
            tracing::debug!(item = %item.raw, %strategy, "item master hit");
            return match entry.valid_volume() {
                Some(cubic_volume) => Ok(ItemHit {
                    entry,
                    cubic_volume,
                    strategy,
                    attempts,
                }),
                None => Err(LookupMiss {
                    item: item.raw.to_string(),
                    reason: MissReason::InvalidVolume,
                    attempts,
                }),
            };
        }

        Err(LookupMiss {
            item: item.raw.to_string(),
            reason: MissReason::NotFound,
            attempts,
        })
    }
}
