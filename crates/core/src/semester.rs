//! Semester lookup for grid grouping.

use std::collections::HashMap;

use crate::discipline::Discipline;
use crate::schedule::AllocationResult;

/// Resolves the semester bucket of a discipline.
///
/// Precedence: the solver's `semesterByDiscipline`, then the registered
/// discipline with the same name, then `""` (the catch-all bucket). Values are
/// trimmed and blank ones fall through to the next source.
pub struct SemesterResolver<'a> {
    from_result: Option<&'a HashMap<String, String>>,
    from_disciplines: HashMap<&'a str, &'a str>,
}

impl<'a> SemesterResolver<'a> {
    pub fn new(result: &'a AllocationResult, disciplines: &'a [Discipline]) -> Self {
        // Later registrations shadow earlier ones with the same name.
        let from_disciplines = disciplines
            .iter()
            .map(|d| (d.name.as_str(), d.semester.as_str()))
            .collect();
        Self {
            from_result: result.semester_by_discipline.as_ref(),
            from_disciplines,
        }
    }

    pub fn resolve(&self, discipline: &str) -> &'a str {
        self.from_result
            .and_then(|m| m.get(discipline))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.from_disciplines
                    .get(discipline)
                    .copied()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or("")
    }
}
