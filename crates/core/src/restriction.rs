//! Restrictions: scheduling constraints supplied by hand or by imported files.
//!
//! Records reach us in many shapes: typed in the wizard, parsed from CSV files
//! by the solver service, or restored from an old snapshot. Every one of them
//! goes through [`normalize_restriction`] and its fixed alias table before it
//! is stored, so the rest of the crate only ever sees the canonical
//! [`Restriction`].
//!
//! | Field         | Aliases (first non-null wins)                                             |
//! |---------------|---------------------------------------------------------------------------|
//! | kind          | `kind` `type` `category` `restrictionType` `restriction` `tipo` `categoria` `tipo_restricao` `restricao` |
//! | discipline    | `discipline` `disciplina` `name` `nome` `disciplina_nome`                 |
//! | block         | `block` `bloco` `slot` `horario`                                          |
//! | day           | `day` `dia`                                                               |
//! | discipline A  | `disciplineA` `disciplina1` `d1` `a`                                      |
//! | discipline B  | `disciplineB` `disciplina2` `d2` `b`                                      |
//! | origin        | `origin` `origem`                                                         |
//!
//! A bare string record is read as its own kind. Missing or unknown kinds
//! become [`RestrictionKind::Fixed`]. Only the fields of the resolved kind's
//! variant are kept: a `fixo` record that also carries `dia` loses the day,
//! and dropped fields take no part in [`Restriction::dedup_key`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::discipline::first_text;
use crate::schedule::block_from_value;

/// Origin stamped on restrictions typed into the wizard.
pub const MANUAL_ORIGIN: &str = "manual";

/// Origin stamped on imported restrictions that did not name their file.
pub const IMPORTED_ORIGIN: &str = "imported";

const KIND_ALIASES: &[&str] = &[
    "kind",
    "type",
    "category",
    "restrictionType",
    "restriction",
    "tipo",
    "categoria",
    "tipo_restricao",
    "restricao",
];
const DISCIPLINE_ALIASES: &[&str] = &["discipline", "disciplina", "name", "nome", "disciplina_nome"];
const BLOCK_ALIASES: &[&str] = &["block", "bloco", "slot", "horario"];
const DAY_ALIASES: &[&str] = &["day", "dia"];
const DISCIPLINE_A_ALIASES: &[&str] = &["disciplineA", "disciplina1", "d1", "a"];
const DISCIPLINE_B_ALIASES: &[&str] = &["disciplineB", "disciplina2", "d2", "b"];
const ORIGIN_ALIASES: &[&str] = &["origin", "origem"];

/// The five canonical restriction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RestrictionKind {
    Fixed,
    FixedDay,
    NoOverlap,
    SameBlock,
    SameTime,
}

impl RestrictionKind {
    pub const ALL: [Self; 5] = [
        Self::Fixed,
        Self::FixedDay,
        Self::NoOverlap,
        Self::SameBlock,
        Self::SameTime,
    ];

    /// Canonical tag, used in dedup keys and user-facing listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::FixedDay => "fixedDay",
            Self::NoOverlap => "noOverlap",
            Self::SameBlock => "sameBlock",
            Self::SameTime => "sameTime",
        }
    }

    /// Tag understood by the solver service.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Fixed => "fixo",
            Self::FixedDay => "dia_fixo",
            Self::NoOverlap => "nao_coincidir",
            Self::SameBlock => "mesmo_bloco",
            Self::SameTime => "mesmo_horario",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Fixed => "Fixed (discipline → block)",
            Self::FixedDay => "Fixed day (discipline → day)",
            Self::NoOverlap => "No overlap (disciplineA, disciplineB)",
            Self::SameBlock => "Same block (disciplineA, disciplineB)",
            Self::SameTime => "Same time (disciplineA, disciplineB)",
        }
    }

    /// Recognize either vocabulary, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = match raw.trim().to_lowercase().as_str() {
            "fixed" | "fixo" => Self::Fixed,
            "fixedday" | "fixed_day" | "dia_fixo" => Self::FixedDay,
            "nooverlap" | "no_overlap" | "nao_coincidir" => Self::NoOverlap,
            "sameblock" | "same_block" | "mesmo_bloco" => Self::SameBlock,
            "sametime" | "same_time" | "mesmo_horario" => Self::SameTime,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a restriction demands, with exactly the fields its kind uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Pin a discipline to one block.
    Fixed { discipline: String, block: Option<u32> },
    /// Keep a discipline on one weekday.
    FixedDay { discipline: String, day: String },
    /// The two disciplines must not share a block.
    NoOverlap { a: String, b: String },
    SameBlock { a: String, b: String },
    SameTime { a: String, b: String },
}

/// A canonical restriction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub rule: Rule,
    /// Source file name, [`MANUAL_ORIGIN`] or [`IMPORTED_ORIGIN`].
    pub origin: Option<String>,
}

impl Restriction {
    pub fn new(rule: Rule) -> Self {
        Self { rule, origin: None }
    }

    /// A fixed-block restriction as typed in the wizard.
    pub fn manual_fixed(discipline: impl Into<String>, block: u32) -> Self {
        Self::new(Rule::Fixed {
            discipline: discipline.into(),
            block: Some(block),
        })
        .with_origin(MANUAL_ORIGIN)
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn kind(&self) -> RestrictionKind {
        match self.rule {
            Rule::Fixed { .. } => RestrictionKind::Fixed,
            Rule::FixedDay { .. } => RestrictionKind::FixedDay,
            Rule::NoOverlap { .. } => RestrictionKind::NoOverlap,
            Rule::SameBlock { .. } => RestrictionKind::SameBlock,
            Rule::SameTime { .. } => RestrictionKind::SameTime,
        }
    }

    pub fn discipline(&self) -> Option<&str> {
        match &self.rule {
            Rule::Fixed { discipline, .. } | Rule::FixedDay { discipline, .. } => Some(discipline),
            _ => None,
        }
    }

    pub fn block(&self) -> Option<u32> {
        match self.rule {
            Rule::Fixed { block, .. } => block,
            _ => None,
        }
    }

    pub fn day(&self) -> Option<&str> {
        match &self.rule {
            Rule::FixedDay { day, .. } => Some(day),
            _ => None,
        }
    }

    /// `(disciplineA, disciplineB)` for the pairwise kinds.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match &self.rule {
            Rule::NoOverlap { a, b } | Rule::SameBlock { a, b } | Rule::SameTime { a, b } => {
                Some((a, b))
            }
            _ => None,
        }
    }

    /// Composite identity used when merging batches:
    /// `kind|discipline|block|day|disciplineA|disciplineB`, missing parts empty.
    /// Origin is not part of the key.
    pub fn dedup_key(&self) -> String {
        let (a, b) = self.pair().unwrap_or(("", ""));
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.kind().as_str(),
            self.discipline().unwrap_or(""),
            self.block().map(|b| b.to_string()).unwrap_or_default(),
            self.day().unwrap_or(""),
            a,
            b,
        )
    }
}

/// Turn any raw record into a canonical [`Restriction`].
///
/// Never fails: unreadable fields become empty, unknown kinds become `fixed`.
pub fn normalize_restriction(raw: &serde_json::Value) -> Restriction {
    let record = match raw {
        serde_json::Value::Object(map) => map,
        serde_json::Value::String(tag) => {
            let kind = RestrictionKind::parse(tag).unwrap_or(RestrictionKind::Fixed);
            return Restriction::new(empty_rule(kind));
        }
        _ => return Restriction::new(empty_rule(RestrictionKind::Fixed)),
    };

    let kind = KIND_ALIASES
        .iter()
        .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
        .and_then(|v| v.as_str())
        .and_then(RestrictionKind::parse)
        .unwrap_or(RestrictionKind::Fixed);

    let text = |aliases: &[&str]| first_text(record, aliases).unwrap_or_default();

    let rule = match kind {
        RestrictionKind::Fixed => Rule::Fixed {
            discipline: text(DISCIPLINE_ALIASES),
            block: BLOCK_ALIASES
                .iter()
                .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
                .and_then(block_from_value),
        },
        RestrictionKind::FixedDay => Rule::FixedDay {
            discipline: text(DISCIPLINE_ALIASES),
            day: text(DAY_ALIASES),
        },
        RestrictionKind::NoOverlap => Rule::NoOverlap {
            a: text(DISCIPLINE_A_ALIASES),
            b: text(DISCIPLINE_B_ALIASES),
        },
        RestrictionKind::SameBlock => Rule::SameBlock {
            a: text(DISCIPLINE_A_ALIASES),
            b: text(DISCIPLINE_B_ALIASES),
        },
        RestrictionKind::SameTime => Rule::SameTime {
            a: text(DISCIPLINE_A_ALIASES),
            b: text(DISCIPLINE_B_ALIASES),
        },
    };

    Restriction {
        rule,
        origin: first_text(record, ORIGIN_ALIASES),
    }
}

/// Normalize a whole batch, preserving order.
pub fn normalize_restrictions(raw: &[serde_json::Value]) -> Vec<Restriction> {
    raw.iter().map(normalize_restriction).collect()
}

fn empty_rule(kind: RestrictionKind) -> Rule {
    match kind {
        RestrictionKind::Fixed => Rule::Fixed {
            discipline: String::new(),
            block: None,
        },
        RestrictionKind::FixedDay => Rule::FixedDay {
            discipline: String::new(),
            day: String::new(),
        },
        RestrictionKind::NoOverlap => Rule::NoOverlap {
            a: String::new(),
            b: String::new(),
        },
        RestrictionKind::SameBlock => Rule::SameBlock {
            a: String::new(),
            b: String::new(),
        },
        RestrictionKind::SameTime => Rule::SameTime {
            a: String::new(),
            b: String::new(),
        },
    }
}

/// Flat record in the solver service's vocabulary.
#[derive(Serialize)]
struct WireRestriction<'a> {
    tipo: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    disciplina: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bloco: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dia: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disciplina1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disciplina2: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origem: Option<&'a str>,
}

impl Serialize for Restriction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pair = self.pair();
        WireRestriction {
            tipo: self.kind().wire_tag(),
            disciplina: self.discipline(),
            bloco: self.block(),
            dia: self.day(),
            disciplina1: pair.map(|(a, _)| a),
            disciplina2: pair.map(|(_, b)| b),
            origem: self.origin.as_deref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Restriction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(normalize_restriction(&raw))
    }
}
