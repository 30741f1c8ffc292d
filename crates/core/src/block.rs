//! Block coordinates: where a flat block index sits in the week.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Weekdays in the fixed order the timetable is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Seg,
    Ter,
    Qua,
    Qui,
    Sex,
    Sab,
    Dom,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Seg,
        Self::Ter,
        Self::Qua,
        Self::Qui,
        Self::Sex,
        Self::Sab,
        Self::Dom,
    ];

    /// The first `days` weekdays, clamped to the week.
    pub fn week(days: u32) -> &'static [Weekday] {
        let n = (days as usize).clamp(1, Self::ALL.len());
        &Self::ALL[..n]
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Grid key: `seg`, `ter`, ...
    pub fn key(&self) -> &'static str {
        match self {
            Self::Seg => "seg",
            Self::Ter => "ter",
            Self::Qua => "qua",
            Self::Qui => "qui",
            Self::Sex => "sex",
            Self::Sab => "sab",
            Self::Dom => "dom",
        }
    }

    /// Abbreviation as it appears in solver labels: `Seg`, `Ter`, ...
    pub fn abbrev(&self) -> &'static str {
        match self {
            Self::Seg => "Seg",
            Self::Ter => "Ter",
            Self::Qua => "Qua",
            Self::Qui => "Qui",
            Self::Sex => "Sex",
            Self::Sab => "Sab",
            Self::Dom => "Dom",
        }
    }

    /// Exact lookup in the label table. Anything else is unplaceable.
    pub fn from_label_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.abbrev() == token)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Coarse half-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "12")]
    First,
    #[serde(rename = "34")]
    Second,
}

impl Period {
    /// Render order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "12",
            Self::Second => "34",
        }
    }

    /// Bucket of a slot within a day.
    ///
    /// Four blocks a day pair up as 0,1 / 2,3. Other sizes split at
    /// `ceil(blocks_per_day / 2)`.
    pub fn of_slot(slot_in_day: u32, blocks_per_day: u32) -> Self {
        let first_half = if blocks_per_day == 4 {
            slot_in_day < 2
        } else {
            slot_in_day < blocks_per_day.div_ceil(2)
        };
        if first_half { Self::First } else { Self::Second }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a block derived purely from its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCoordinate {
    pub day_index: u32,
    pub slot_in_day: u32,
    pub period: Period,
}

impl BlockCoordinate {
    /// `blocks_per_day == 0` is treated as 1.
    pub fn from_index(block: u32, blocks_per_day: u32) -> Self {
        let per_day = blocks_per_day.max(1);
        let slot_in_day = block % per_day;
        Self {
            day_index: block / per_day,
            slot_in_day,
            period: Period::of_slot(slot_in_day, per_day),
        }
    }

    /// Index back from a (day, slot) pair.
    pub fn block_index(day_index: u32, slot_in_day: u32, blocks_per_day: u32) -> u32 {
        day_index
            .saturating_mul(blocks_per_day.max(1))
            .saturating_add(slot_in_day)
    }
}

/// Tokens of a solver label such as `"Seg 08:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelParts<'a> {
    pub day: &'a str,
    pub time: &'a str,
}

impl<'a> LabelParts<'a> {
    pub fn split(label: &'a str) -> Self {
        let mut tokens = label.split_whitespace();
        Self {
            day: tokens.next().unwrap_or(""),
            time: tokens.next().unwrap_or(""),
        }
    }

    /// Weekday named by the label, if it is one we know.
    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::from_label_token(self.day)
    }
}
