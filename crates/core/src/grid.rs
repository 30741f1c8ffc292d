//! Weekly grid assembly: the on-screen view of an allocation.
//!
//! The grid has three levels: semester → period → day → labels. Disciplines
//! whose semester cannot be resolved go to a separate catch-all grid, and
//! blocks whose label names no known weekday, or a weekday past the
//! configured week, are reported as unplaceable.
//! Nothing here fails; bad data only shrinks the view.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::block::{BlockCoordinate, LabelParts, Period, Weekday};
use crate::discipline::Discipline;
use crate::schedule::{AllocationResult, ScheduleConfig};
use crate::semester::SemesterResolver;

/// Period → day → labels, in allocation order within each cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodGrid {
    cells: BTreeMap<Period, BTreeMap<Weekday, Vec<String>>>,
}

impl PeriodGrid {
    fn push(&mut self, period: Period, day: Weekday, label: String) {
        self.cells
            .entry(period)
            .or_default()
            .entry(day)
            .or_default()
            .push(label);
    }

    /// Labels in one cell; empty when nothing was placed there.
    pub fn cell(&self, period: Period, day: Weekday) -> &[String] {
        self.cells
            .get(&period)
            .and_then(|days| days.get(&day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of labels across all cells.
    pub fn len(&self) -> usize {
        self.cells
            .values()
            .flat_map(|days| days.values())
            .map(Vec::len)
            .sum()
    }
}

/// One semester's block of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterGrid {
    pub semester: String,
    pub periods: PeriodGrid,
}

/// An allocation entry that could not be put on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unplaceable {
    pub discipline: String,
    pub block: u32,
    /// The label as the solver sent it (possibly empty).
    pub label: String,
}

/// The assembled weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    /// Columns, in weekly order, truncated to the configured days.
    pub days: Vec<Weekday>,
    /// Semesters in render order.
    pub semesters: Vec<SemesterGrid>,
    /// Disciplines without a resolvable semester.
    pub unassigned: PeriodGrid,
    pub unplaceable: Vec<Unplaceable>,
}

impl Grid {
    /// Row order for every semester block.
    pub fn periods(&self) -> [Period; 2] {
        Period::ALL
    }

    pub fn semester(&self, semester: &str) -> Option<&PeriodGrid> {
        self.semesters
            .iter()
            .find(|s| s.semester == semester)
            .map(|s| &s.periods)
    }

    /// Cell lookup; an empty semester addresses the catch-all grid.
    pub fn cell(&self, semester: &str, period: Period, day: Weekday) -> &[String] {
        if semester.is_empty() {
            return self.unassigned.cell(period, day);
        }
        self.semester(semester)
            .map(|grid| grid.cell(period, day))
            .unwrap_or(&[])
    }

    /// Number of allocation entries that landed somewhere on the grid.
    pub fn placed(&self) -> usize {
        self.semesters.iter().map(|s| s.periods.len()).sum::<usize>() + self.unassigned.len()
    }
}

/// Builds a [`Grid`] from `(config, result, disciplines)`.
///
/// Pure: the same inputs always give the same grid.
pub struct GridAssembler<'a> {
    config: &'a ScheduleConfig,
    result: &'a AllocationResult,
    disciplines: &'a [Discipline],
}

impl<'a> GridAssembler<'a> {
    pub fn new(
        config: &'a ScheduleConfig,
        result: &'a AllocationResult,
        disciplines: &'a [Discipline],
    ) -> Self {
        Self {
            config,
            result,
            disciplines,
        }
    }

    pub fn assemble(&self) -> Grid {
        let blocks_per_day = self.config.effective_blocks_per_day();
        let days = self.config.effective_days();
        let resolver = SemesterResolver::new(self.result, self.disciplines);

        let mut by_semester: HashMap<&str, PeriodGrid> = HashMap::new();
        let mut unassigned = PeriodGrid::default();
        let mut unplaceable = Vec::new();

        for (discipline, block) in self.result.allocation.iter() {
            let label = self.result.block_label(block);
            let Some(day) = LabelParts::split(label).weekday() else {
                debug!(%discipline, block, %label, "Block label names no known weekday, leaving it off the grid");
                unplaceable.push(Unplaceable {
                    discipline: discipline.to_string(),
                    block,
                    label: label.to_string(),
                });
                continue;
            };
            if day.index() >= days {
                debug!(%discipline, block, %label, days, "Block falls on a day outside the configured week");
                unplaceable.push(Unplaceable {
                    discipline: discipline.to_string(),
                    block,
                    label: label.to_string(),
                });
                continue;
            }

            let period = BlockCoordinate::from_index(block, blocks_per_day).period;
            let text = self.result.display_label(discipline).to_string();

            match resolver.resolve(discipline) {
                "" => unassigned.push(period, day, text),
                semester => by_semester.entry(semester).or_default().push(period, day, text),
            }
        }

        let mut semesters: Vec<SemesterGrid> = by_semester
            .into_iter()
            .map(|(semester, periods)| SemesterGrid {
                semester: semester.to_string(),
                periods,
            })
            .collect();
        sort_semesters(&mut semesters);

        Grid {
            days: Weekday::week(days).to_vec(),
            semesters,
            unassigned,
            unplaceable,
        }
    }
}

/// Shorthand for `GridAssembler::new(..).assemble()`.
pub fn assemble_grid(
    config: &ScheduleConfig,
    result: &AllocationResult,
    disciplines: &[Discipline],
) -> Grid {
    GridAssembler::new(config, result, disciplines).assemble()
}

/// Numeric order when every key is a number, lexicographic otherwise.
fn sort_semesters(semesters: &mut [SemesterGrid]) {
    let numeric = |s: &SemesterGrid| s.semester.parse::<f64>().ok().filter(|n| n.is_finite());

    if semesters.iter().all(|s| numeric(s).is_some()) {
        semesters.sort_by(|a, b| {
            numeric(a)
                .partial_cmp(&numeric(b))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.semester.cmp(&b.semester))
        });
    } else {
        semesters.sort_by(|a, b| a.semester.cmp(&b.semester));
    }
}
