//! Restriction reconciliation: folding imported batches into the list the
//! wizard already holds, and summarizing the result.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::restriction::{IMPORTED_ORIGIN, Restriction, RestrictionKind};

/// How an imported batch combines with the existing list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// The batch becomes the whole list.
    #[default]
    Replace,
    /// The batch is folded in by dedup key, last write wins.
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        })
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "substituir" => Ok(Self::Replace),
            "merge" | "mesclar" => Ok(Self::Merge),
            other => Err(format!("unknown import mode '{other}' (expected replace or merge)")),
        }
    }
}

/// Result of reconciling one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub restrictions: Vec<Restriction>,
    /// Records whose key was new.
    pub appended: usize,
    /// Records that overwrote an existing key (in merge mode) or collapsed onto
    /// an earlier record of the same batch.
    pub replaced: usize,
}

/// Fold `batch` into `existing`.
///
/// Merge mode seeds a key → record table from `existing`, then writes every
/// batch record into it: existing keys are overwritten in place, new keys are
/// appended. The result never holds two records with the same key, and
/// merging the same batch twice changes nothing.
pub fn reconcile(existing: &[Restriction], batch: Vec<Restriction>, mode: ImportMode) -> MergeOutcome {
    let outcome = match mode {
        ImportMode::Replace => MergeOutcome {
            appended: batch.len(),
            replaced: 0,
            restrictions: batch,
        },
        ImportMode::Merge => {
            let mut keyed = KeyedList::default();
            for r in existing {
                keyed.upsert(r.clone());
            }
            let (mut appended, mut replaced) = (0, 0);
            for r in batch {
                if keyed.upsert(r) {
                    appended += 1;
                } else {
                    replaced += 1;
                }
            }
            MergeOutcome {
                restrictions: keyed.into_vec(),
                appended,
                replaced,
            }
        }
    };
    debug!(
        %mode,
        appended = outcome.appended,
        replaced = outcome.replaced,
        total = outcome.restrictions.len(),
        "Reconciled restriction batch"
    );
    outcome
}

/// Convenience wrapper returning only the merged list.
pub fn merge_restrictions(existing: &[Restriction], batch: Vec<Restriction>) -> Vec<Restriction> {
    reconcile(existing, batch, ImportMode::Merge).restrictions
}

/// Give every imported record an origin, keeping any the service supplied.
pub fn stamp_imported(batch: &mut [Restriction]) {
    for r in batch.iter_mut().filter(|r| r.origin.is_none()) {
        r.origin = Some(IMPORTED_ORIGIN.to_string());
    }
}

/// Insertion-ordered list with unique dedup keys.
#[derive(Default)]
struct KeyedList {
    slots: Vec<Restriction>,
    index: HashMap<String, usize>,
}

impl KeyedList {
    /// Returns `true` when the key was new.
    fn upsert(&mut self, r: Restriction) -> bool {
        let key = r.dedup_key();
        match self.index.get(&key) {
            Some(&at) => {
                self.slots[at] = r;
                false
            }
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push(r);
                true
            }
        }
    }

    fn into_vec(self) -> Vec<Restriction> {
        self.slots
    }
}

/// Filter for listing restrictions.
#[derive(Debug, Clone, Default)]
pub struct RestrictionFilter {
    pub kind: Option<RestrictionKind>,
    pub origin: Option<String>,
}

impl RestrictionFilter {
    pub fn matches(&self, r: &Restriction) -> bool {
        self.kind.is_none_or(|k| r.kind() == k)
            && self
                .origin
                .as_deref()
                .is_none_or(|o| r.origin.as_deref() == Some(o))
    }
}

/// Counts and groupings for the restriction overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionSummary {
    /// `(kind, count)`, most frequent first.
    pub counts: Vec<(RestrictionKind, usize)>,
    /// Distinct origins in first-seen order.
    pub origins: Vec<String>,
    pub total: usize,
}

impl RestrictionSummary {
    pub fn of(restrictions: &[Restriction]) -> Self {
        let mut counts: HashMap<RestrictionKind, usize> = HashMap::new();
        let mut origins: Vec<String> = Vec::new();
        for r in restrictions {
            *counts.entry(r.kind()).or_default() += 1;
            if let Some(origin) = &r.origin {
                if !origins.contains(origin) {
                    origins.push(origin.clone());
                }
            }
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|(ka, a), (kb, b)| b.cmp(a).then(ka.cmp(kb)));
        Self {
            counts,
            origins,
            total: restrictions.len(),
        }
    }

    /// One-line overview such as `fixed: 3 | noOverlap: 1`.
    pub fn line(&self) -> String {
        self.counts
            .iter()
            .map(|(kind, n)| format!("{kind}: {n}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// A group of same-kind restrictions rendered as CSV-like text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionGroup {
    pub kind: RestrictionKind,
    pub header: &'static str,
    pub rows: Vec<String>,
}

/// Group the filtered restrictions by kind, largest group first.
pub fn group_by_kind(restrictions: &[Restriction], filter: &RestrictionFilter) -> Vec<RestrictionGroup> {
    let mut groups: Vec<RestrictionGroup> = Vec::new();
    for r in restrictions.iter().filter(|r| filter.matches(r)) {
        let kind = r.kind();
        let row = match kind {
            RestrictionKind::Fixed => format!(
                "{},{}",
                r.discipline().unwrap_or(""),
                r.block().map(|b| b.to_string()).unwrap_or_default()
            ),
            RestrictionKind::FixedDay => {
                format!("{},{}", r.discipline().unwrap_or(""), r.day().unwrap_or(""))
            }
            _ => {
                let (a, b) = r.pair().unwrap_or(("", ""));
                format!("{a},{b}")
            }
        };
        match groups.iter_mut().find(|g| g.kind == kind) {
            Some(group) => group.rows.push(row),
            None => groups.push(RestrictionGroup {
                kind,
                header: group_header(kind),
                rows: vec![row],
            }),
        }
    }
    groups.sort_by(|a, b| b.rows.len().cmp(&a.rows.len()).then(a.kind.cmp(&b.kind)));
    groups
}

fn group_header(kind: RestrictionKind) -> &'static str {
    match kind {
        RestrictionKind::Fixed => "discipline,block",
        RestrictionKind::FixedDay => "discipline,day",
        _ => "disciplineA,disciplineB",
    }
}
