use crate::attendance::summarize;
use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{create_with, list_with, parse_params, to_json, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::attendance::{AttendanceFilter, SqliteAttendance};
use crate::repo::validate::optional;
use crate::repo::Repository;
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;

/// Overall summary for the matching records plus one per student.
fn attendance_summary(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filter: AttendanceFilter = parse_params(params)?;
    if optional(&filter.student_id).is_none() && optional(&filter.class_id).is_none() {
        return Err(HandlerErr::bad_params("studentId or classId is required"));
    }
    let records = SqliteAttendance::new(conn).list(&filter)?;

    let mut per_student: BTreeMap<&str, (&str, Vec<_>)> = BTreeMap::new();
    for r in &records {
        per_student
            .entry(r.student_id.as_str())
            .or_insert_with(|| (r.student_name.as_str(), Vec::new()))
            .1
            .push(r.status);
    }
    let students: Vec<serde_json::Value> = per_student
        .into_iter()
        .map(|(id, (name, statuses))| {
            json!({
                "studentId": id,
                "studentName": name,
                "summary": summarize(statuses),
            })
        })
        .collect();

    let overall = summarize(records.iter().map(|r| r.status));
    Ok(json!({
        "summary": to_json(&overall)?,
        "students": students,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(with_db(state, req, |conn, params| {
            create_with(&SqliteAttendance::new(conn), params, "record")
        })),
        "attendance.list" => Some(with_db(state, req, |conn, params| {
            list_with(&SqliteAttendance::new(conn), params, "records")
        })),
        "attendance.summary" => Some(with_db(state, req, attendance_summary)),
        _ => None,
    }
}
