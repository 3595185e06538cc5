use crate::grades::summarize;
use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{create_with, list_with, parse_params, to_json, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::submissions::{GradeInput, SqliteSubmissions, SubmissionFilter};
use rusqlite::Connection;
use serde_json::json;

fn homework_grade(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let input: GradeInput = parse_params(params)?;
    let submission = SqliteSubmissions::new(conn)
        .grade(input)
        .map_err(HandlerErr::from_write)?;
    Ok(json!({ "submission": to_json(&submission)? }))
}

/// Graded submissions in grading order, with their average.
fn grades_list(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filter: SubmissionFilter = parse_params(params)?;
    let grades = SqliteSubmissions::new(conn).graded(&filter)?;
    let summary = summarize(grades.iter().filter_map(|g| g.grade.zip(g.max_grade)));
    Ok(json!({
        "grades": to_json(&grades)?,
        "summary": to_json(&summary)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "homework.submit" => Some(with_db(state, req, |conn, params| {
            create_with(&SqliteSubmissions::new(conn), params, "submission")
        })),
        "homework.submissions" => Some(with_db(state, req, |conn, params| {
            list_with(&SqliteSubmissions::new(conn), params, "submissions")
        })),
        "homework.grade" => Some(with_db(state, req, homework_grade)),
        "grades.list" => Some(with_db(state, req, grades_list)),
        _ => None,
    }
}
