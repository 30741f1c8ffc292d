//! Turning solver error bodies into [`SolverError`]s.
//!
//! The service reports problems as `{"detail": ...}` where `detail` is either
//! a list of `{loc, msg}` objects (input validation) or a free-form string
//! (solver failure, missing file).

use classgrid_core::{FieldIssue, SolverError};
use serde_json::Value;

/// Map a non-success response to an error.
pub fn error_from_response(status_code: u16, body: &str) -> SolverError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::Array(items)) => {
            SolverError::Validation(items.iter().map(field_issue).collect())
        }
        Some(Value::String(message)) => SolverError::ApiError {
            status_code,
            message,
        },
        _ => SolverError::ApiError {
            status_code,
            message: body.trim().to_string(),
        },
    }
}

fn field_issue(item: &Value) -> FieldIssue {
    let path = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|loc| {
            loc.iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();

    let message = match item.get("msg") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => item.to_string(),
    };

    FieldIssue { path, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_list_becomes_field_issues() {
        let body = r#"{"detail":[
            {"loc":["body","config","dias_semana"],"msg":"field required","type":"missing"},
            {"loc":["body","disciplinas",0,"nome"],"msg":"str type expected"}
        ]}"#;
        let SolverError::Validation(issues) = error_from_response(422, body) else {
            panic!("expected validation error");
        };
        assert_eq!(issues[0].path, "body.config.dias_semana");
        assert_eq!(issues[0].message, "field required");
        assert_eq!(issues[1].path, "body.disciplinas.0.nome");
    }

    #[test]
    fn string_detail_is_single_message() {
        let err = error_from_response(400, r#"{"detail":"\nERRO: sem blocos suficientes"}"#);
        match err {
            SolverError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert!(message.contains("sem blocos suficientes"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_bodies_fall_back_to_text() {
        let err = error_from_response(502, "Bad Gateway\n");
        assert_eq!(
            err.to_string(),
            "Solver request failed: Bad Gateway (status: 502)"
        );

        let err = error_from_response(500, r#"{"detail":{"code":7}}"#);
        assert!(err.to_string().contains("\"code\":7"));
    }

    #[test]
    fn issue_without_loc_has_empty_path() {
        let SolverError::Validation(issues) = error_from_response(422, r#"{"detail":[{"msg":"bad"}]}"#)
        else {
            panic!("expected validation error");
        };
        assert_eq!(issues[0].to_string(), "bad");
    }
}
