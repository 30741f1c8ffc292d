//! Disciplines (courses) and the normalizer for loosely shaped records.

use serde::{Deserialize, Serialize};

/// A course offering to be placed in the timetable.
///
/// `name` is the only key the pipeline has: two disciplines with the same
/// name are indistinguishable downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,

    /// One or more professors, separated by `|`, `,`, `;` or `/`.
    #[serde(rename = "prof", alias = "professor", default)]
    pub professor: String,

    /// Semester bucket; empty when unknown.
    #[serde(rename = "semestre", alias = "semester", default)]
    pub semester: String,
}

impl Discipline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            professor: String::new(),
            semester: String::new(),
        }
    }

    pub fn with_professor(mut self, professor: impl Into<String>) -> Self {
        self.professor = professor.into();
        self
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = semester.into();
        self
    }
}

const NAME_ALIASES: &[&str] = &["nome", "Nome", "name", "disciplina"];
const PROFESSOR_ALIASES: &[&str] = &["prof", "professor", "professores"];
const SEMESTER_ALIASES: &[&str] = &["semestre", "Semestre", "semester"];

/// First alias holding a usable scalar, rendered as trimmed text.
pub(crate) fn first_text(record: &serde_json::Map<String, serde_json::Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| match record.get(*key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Build a [`Discipline`] from a dataset row of unknown shape.
///
/// Returns `None` for rows without a name.
pub fn normalize_discipline(raw: &serde_json::Value) -> Option<Discipline> {
    let record = raw.as_object()?;
    let name = first_text(record, NAME_ALIASES)?;
    Some(Discipline {
        name,
        professor: first_text(record, PROFESSOR_ALIASES).unwrap_or_default(),
        semester: first_text(record, SEMESTER_ALIASES).unwrap_or_default(),
    })
}

/// Normalize a batch, dropping nameless rows.
pub fn normalize_disciplines(raw: &[serde_json::Value]) -> Vec<Discipline> {
    raw.iter().filter_map(normalize_discipline).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_alias_fields() {
        let d = normalize_discipline(&json!({
            "Nome": " Cálculo I ",
            "professores": "Ana|Bruno",
            "Semestre": 1
        }))
        .unwrap();
        assert_eq!(d.name, "Cálculo I");
        assert_eq!(d.professor, "Ana|Bruno");
        assert_eq!(d.semester, "1");
    }

    #[test]
    fn first_alias_wins() {
        let d = normalize_discipline(&json!({"nome": "A", "name": "B", "prof": "X"})).unwrap();
        assert_eq!(d.name, "A");
        assert_eq!(d.professor, "X");
        assert_eq!(d.semester, "");
    }

    #[test]
    fn nameless_rows_are_dropped() {
        let batch = vec![
            json!({"prof": "Ana"}),
            json!({"nome": ""}),
            json!("not a record"),
            json!({"disciplina": "Redes"}),
        ];
        let out = normalize_disciplines(&batch);
        assert_eq!(out, vec![Discipline::new("Redes")]);
    }

    #[test]
    fn serializes_with_wire_names() {
        let d = Discipline::new("Redes").with_professor("Carla").with_semester("5");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json, json!({"nome": "Redes", "prof": "Carla", "semestre": "5"}));
    }
}
