//! Schedule configuration and the solver's allocation result.
//!
//! Field names on the wire follow the solver service (`dias_semana`,
//! `alocacao`, ...). The English spellings are accepted as aliases so that
//! hand-written snapshots and fixtures stay readable.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::{Error, Result};

/// Number of weekdays the wizard knows about (Seg..Dom).
pub const MAX_DAYS_PER_WEEK: u32 = 7;

/// Upper bound on blocks in one day.
pub const MAX_BLOCKS_PER_DAY: u32 = 24;

/// Shape of the weekly timetable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(rename = "dias_semana", alias = "daysPerWeek", default = "default_days")]
    pub days_per_week: u32,

    #[serde(rename = "blocos_por_dia", alias = "blocksPerDay", default = "default_blocks")]
    pub blocks_per_day: u32,

    /// Two disciplines taught by the same professor may not share a block.
    #[serde(rename = "conflito_por_prof", alias = "conflictByProfessor", default = "default_true")]
    pub conflict_by_professor: bool,

    /// Two disciplines of the same semester may not share a block.
    #[serde(rename = "conflito_por_semestre", alias = "conflictBySemester", default = "default_true")]
    pub conflict_by_semester: bool,
}

fn default_days() -> u32 {
    5
}
fn default_blocks() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            days_per_week: default_days(),
            blocks_per_day: default_blocks(),
            conflict_by_professor: true,
            conflict_by_semester: true,
        }
    }
}

impl ScheduleConfig {
    /// Days actually rendered: clamped into `1..=7`.
    pub fn effective_days(&self) -> u32 {
        self.days_per_week.clamp(1, MAX_DAYS_PER_WEEK)
    }

    /// Blocks per day used by the projections: clamped into `1..=24`.
    pub fn effective_blocks_per_day(&self) -> u32 {
        self.blocks_per_day.clamp(1, MAX_BLOCKS_PER_DAY)
    }

    /// Total number of blocks the solver may assign.
    pub fn total_blocks(&self) -> u32 {
        self.effective_days()
            .saturating_mul(self.effective_blocks_per_day())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DAYS_PER_WEEK).contains(&self.days_per_week) {
            return Err(Error::Config {
                message: format!(
                    "days_per_week must be between 1 and {MAX_DAYS_PER_WEEK}, got {}",
                    self.days_per_week
                ),
            });
        }
        if !(1..=MAX_BLOCKS_PER_DAY).contains(&self.blocks_per_day) {
            return Err(Error::Config {
                message: format!(
                    "blocks_per_day must be between 1 and {MAX_BLOCKS_PER_DAY}, got {}",
                    self.blocks_per_day
                ),
            });
        }
        Ok(())
    }
}

/// Parse a block index from loosely typed JSON: a non-negative integer or a
/// string holding one. Anything else is treated as absent.
pub(crate) fn block_from_value(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Discipline → block mapping that keeps the order the solver emitted it in.
///
/// Grid cells and the flat export list follow this order, so a plain
/// `HashMap` would not do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation(Vec<(String, u32)>);

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update. An update keeps the entry's first position.
    pub fn insert(&mut self, discipline: impl Into<String>, block: u32) {
        let discipline = discipline.into();
        match self.0.iter_mut().find(|(d, _)| *d == discipline) {
            Some(entry) => entry.1 = block,
            None => self.0.push((discipline, block)),
        }
    }

    pub fn get(&self, discipline: &str) -> Option<u32> {
        self.0
            .iter()
            .find(|(d, _)| d == discipline)
            .map(|(_, b)| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(d, b)| (d.as_str(), *b))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut allocation = Self::new();
        for (discipline, block) in iter {
            allocation.insert(discipline, block);
        }
        allocation
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (discipline, block) in &self.0 {
            map.serialize_entry(discipline, block)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Allocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AllocationVisitor;

        impl<'de> Visitor<'de> for AllocationVisitor {
            type Value = Allocation;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of discipline name to block index")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Allocation, A::Error> {
                let mut allocation = Allocation::new();
                while let Some((discipline, raw)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    match block_from_value(&raw) {
                        Some(block) => allocation.insert(discipline, block),
                        None => warn!(%discipline, value = %raw, "Ignoring allocation entry with unusable block index"),
                    }
                }
                Ok(allocation)
            }
        }

        deserializer.deserialize_map(AllocationVisitor)
    }
}

/// Aggregate numbers the solver reports alongside an allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    #[serde(rename = "blocos_usados", alias = "usedBlocks", default)]
    pub used_blocks: u32,

    #[serde(rename = "total_blocos", alias = "totalBlocks", default)]
    pub total_blocks: u32,

    /// Largest minus smallest discipline count over the used blocks.
    #[serde(rename = "desbalanceamento", alias = "imbalance", default)]
    pub imbalance: u32,

    /// Disciplines per used block, keyed by block index as text.
    #[serde(
        rename = "dist_por_bloco",
        alias = "distribution",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub distribution: BTreeMap<String, u32>,
}

/// What the solver hands back for one `generate` call. Read-only to the
/// projections; replaced wholesale by the next call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    #[serde(rename = "alocacao", alias = "allocation", default)]
    pub allocation: Allocation,

    /// Block index → `"<DayAbbrev> <HH:MM>"`.
    #[serde(rename = "horarios", alias = "blockLabels", default)]
    pub block_labels: BTreeMap<u32, String>,

    #[serde(rename = "nome_exibicao", alias = "displayName", default)]
    pub display_name: HashMap<String, String>,

    #[serde(
        rename = "semestre_por_disc",
        alias = "semesterByDiscipline",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub semester_by_discipline: Option<HashMap<String, String>>,

    #[serde(default)]
    pub stats: ScheduleStats,

    /// Solver console output, if it chose to send it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl AllocationResult {
    /// Human label for a discipline, falling back to its name.
    pub fn display_label<'a>(&'a self, discipline: &'a str) -> &'a str {
        self.display_name
            .get(discipline)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(discipline)
    }

    /// Label of a block, or `""` when the solver did not name it.
    pub fn block_label(&self, block: u32) -> &str {
        self.block_labels.get(&block).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_wizard_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.days_per_week, 5);
        assert_eq!(config.blocks_per_day, 4);
        assert_eq!(config.total_blocks(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation_rejects_out_of_range() {
        let config = ScheduleConfig {
            days_per_week: 8,
            ..ScheduleConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScheduleConfig {
            blocks_per_day: 0,
            ..ScheduleConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.effective_blocks_per_day(), 1);
    }

    #[test]
    fn huge_block_count_is_rejected_and_clamped() {
        let config = ScheduleConfig {
            days_per_week: 5,
            blocks_per_day: 1_000_000_000,
            ..ScheduleConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blocks_per_day"));
        assert_eq!(config.effective_blocks_per_day(), MAX_BLOCKS_PER_DAY);
        assert_eq!(config.total_blocks(), 5 * MAX_BLOCKS_PER_DAY);

        let widest = ScheduleConfig {
            days_per_week: MAX_DAYS_PER_WEEK,
            blocks_per_day: MAX_BLOCKS_PER_DAY,
            ..ScheduleConfig::default()
        };
        assert!(widest.validate().is_ok());
        assert_eq!(widest.total_blocks(), 168);
    }

    #[test]
    fn config_accepts_both_spellings() {
        let wire: ScheduleConfig =
            serde_json::from_str(r#"{"dias_semana":6,"blocos_por_dia":3}"#).unwrap();
        let english: ScheduleConfig =
            serde_json::from_str(r#"{"daysPerWeek":6,"blocksPerDay":3}"#).unwrap();
        assert_eq!(wire, english);
        assert!(wire.conflict_by_professor);

        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains("\"dias_semana\":6"));
    }

    #[test]
    fn allocation_preserves_wire_order() {
        let allocation: Allocation =
            serde_json::from_str(r#"{"Zoologia":3,"Algebra":1,"Fisica":"7"}"#).unwrap();
        let names: Vec<_> = allocation.iter().map(|(d, _)| d).collect();
        assert_eq!(names, ["Zoologia", "Algebra", "Fisica"]);
        assert_eq!(allocation.get("Fisica"), Some(7));

        let json = serde_json::to_string(&allocation).unwrap();
        assert_eq!(json, r#"{"Zoologia":3,"Algebra":1,"Fisica":7}"#);
    }

    #[test]
    fn allocation_skips_unusable_blocks() {
        let allocation: Allocation =
            serde_json::from_str(r#"{"A":-1,"B":"x","C":null,"D":2}"#).unwrap();
        assert_eq!(allocation.len(), 1);
        assert_eq!(allocation.get("D"), Some(2));
    }

    #[test]
    fn allocation_insert_updates_in_place() {
        let mut allocation: Allocation = [("A", 1), ("B", 2)].into_iter().collect();
        allocation.insert("A", 9);
        let entries: Vec<_> = allocation.iter().collect();
        assert_eq!(entries, [("A", 9), ("B", 2)]);
    }

    #[test]
    fn result_parses_solver_payload() {
        let payload = serde_json::json!({
            "alocacao": {"Calc I": 0, "Phys I": 10},
            "horarios": {"0": "Seg 08:00", "10": "Qua 14:00"},
            "nome_exibicao": {"Calc I": "Calc I / Ana"},
            "stats": {"total_blocos": 20, "blocos_usados": 2, "desbalanceamento": 0,
                      "dist_por_bloco": {"0": 1, "10": 1}},
            "logs": "ok"
        });
        let result: AllocationResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.block_label(10), "Qua 14:00");
        assert_eq!(result.block_label(11), "");
        assert_eq!(result.display_label("Calc I"), "Calc I / Ana");
        assert_eq!(result.display_label("Phys I"), "Phys I");
        assert_eq!(result.stats.used_blocks, 2);
        assert!(result.semester_by_discipline.is_none());
    }
}
