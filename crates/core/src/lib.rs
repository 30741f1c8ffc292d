//! # classgrid Core
//!
//! Domain types, projections and traits for the classgrid timetable wizard.
//! This crate has **no I/O framework dependencies**: the HTTP solver client
//! and the snapshot stores live in their own crates and implement the traits
//! defined here.
//!
//! ## Layout
//!
//! - [`schedule`], [`discipline`], [`restriction`]: the data the wizard edits
//! - [`block`], [`semester`], [`grid`]: allocation → weekly grid
//! - [`reconcile`]: merging restriction batches without duplicates
//! - [`export`]: matrix and list projections with CSV escaping
//! - [`solver`], [`snapshot`]: the seams to the outside world

pub mod block;
pub mod discipline;
pub mod error;
pub mod export;
pub mod grid;
pub mod reconcile;
pub mod restriction;
pub mod schedule;
pub mod semester;
pub mod snapshot;
pub mod solver;

// Re-export key types at crate root for ergonomics
pub use block::{BlockCoordinate, LabelParts, Period, Weekday};
pub use discipline::{normalize_discipline, normalize_disciplines, Discipline};
pub use error::{Error, FieldIssue, Result, SnapshotError, SolverError};
pub use export::{escape_field, parse_field, BlockCollision, CsvTable, MatrixExport, TabularExporter};
pub use grid::{assemble_grid, Grid, GridAssembler, PeriodGrid, SemesterGrid, Unplaceable};
pub use reconcile::{
    group_by_kind, merge_restrictions, reconcile, ImportMode, MergeOutcome, RestrictionFilter,
    RestrictionGroup, RestrictionSummary,
};
pub use restriction::{
    normalize_restriction, normalize_restrictions, Restriction, RestrictionKind, Rule,
    IMPORTED_ORIGIN, MANUAL_ORIGIN,
};
pub use schedule::{Allocation, AllocationResult, ScheduleConfig, ScheduleStats};
pub use semester::SemesterResolver;
pub use snapshot::{SnapshotStore, WizardSnapshot, WizardStep};
pub use solver::{Dataset, ExportLocations, ExportRequest, ScheduleRequest, SolverBackend};
