//! Tabular exports of an allocation: a day-by-time matrix and a flat
//! per-discipline list, both renderable as CSV.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::block::{BlockCoordinate, LabelParts, Weekday};
use crate::schedule::{AllocationResult, ScheduleConfig};

/// Quote a field iff it holds `"`, `,` or a newline, doubling inner quotes.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Inverse of [`escape_field`] for a single field.
///
/// Returns `None` for a quoted field that is not well formed.
pub fn parse_field(raw: &str) -> Option<String> {
    let Some(inner) = raw.strip_prefix('"') else {
        return Some(raw.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            // Inside a quoted field a quote only appears doubled.
            if chars.next() != Some('"') {
                return None;
            }
        }
        out.push(c);
    }
    Some(out)
}

/// Join already-rendered fields into one CSV line.
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// A header plus rows of plain text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Lines separated by `\n`, no trailing newline.
    pub fn to_csv_string(&self) -> String {
        std::iter::once(csv_line(&self.header))
            .chain(self.rows.iter().map(|row| csv_line(row)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes the table as CSV to a file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_csv_string())
    }

    /// Writes the table as CSV to a writer.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.to_csv_string().as_bytes())
    }
}

/// Two or more disciplines the solver put in the same block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockCollision {
    pub block: u32,
    /// Discipline shown in the matrix (the first one seen).
    pub kept: String,
    pub discarded: String,
}

/// Day-by-time matrix plus what had to be left out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixExport {
    pub table: CsvTable,
    pub collisions: Vec<BlockCollision>,
}

/// Re-projects an allocation into the two download formats.
pub struct TabularExporter<'a> {
    config: &'a ScheduleConfig,
    result: &'a AllocationResult,
}

impl<'a> TabularExporter<'a> {
    pub fn new(config: &'a ScheduleConfig, result: &'a AllocationResult) -> Self {
        Self { config, result }
    }

    /// Rows are the slots of a day, columns the configured weekdays.
    ///
    /// Each block shows one discipline. When the solver put several in the
    /// same block the first in allocation order is kept and the rest are
    /// reported as collisions.
    pub fn matrix(&self) -> MatrixExport {
        let blocks_per_day = self.config.effective_blocks_per_day();
        let days = Weekday::week(self.config.effective_days());

        let mut by_block: HashMap<u32, &str> = HashMap::new();
        let mut collisions = Vec::new();
        for (discipline, block) in self.result.allocation.iter() {
            match by_block.get(&block) {
                Some(kept) => {
                    debug!(block, kept = %kept, discarded = %discipline, "Block already taken in matrix export");
                    collisions.push(BlockCollision {
                        block,
                        kept: kept.to_string(),
                        discarded: discipline.to_string(),
                    });
                }
                None => {
                    by_block.insert(block, discipline);
                }
            }
        }

        let mut header = vec!["Time".to_string()];
        header.extend(days.iter().map(|d| d.abbrev().to_string()));

        let rows = (0..blocks_per_day)
            .map(|slot| {
                let time = LabelParts::split(self.result.block_label(slot)).time;
                let mut row = vec![if time.is_empty() {
                    format!("Block {slot}")
                } else {
                    time.to_string()
                }];
                row.extend(days.iter().map(|day| {
                    let block = BlockCoordinate::block_index(day.index(), slot, blocks_per_day);
                    by_block
                        .get(&block)
                        .map(|d| self.result.display_label(d).to_string())
                        .unwrap_or_default()
                }));
                row
            })
            .collect();

        MatrixExport {
            table: CsvTable { header, rows },
            collisions,
        }
    }

    /// One row per allocated discipline: label, block, day token, time token.
    pub fn list(&self) -> CsvTable {
        let header = ["Discipline", "Block", "Day", "Time"]
            .map(String::from)
            .to_vec();
        let rows = self
            .result
            .allocation
            .iter()
            .map(|(discipline, block)| {
                let parts = LabelParts::split(self.result.block_label(block));
                vec![
                    self.result.display_label(discipline).to_string(),
                    block.to_string(),
                    parts.day.to_string(),
                    parts.time.to_string(),
                ]
            })
            .collect();
        CsvTable { header, rows }
    }
}
