use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{create_with, list_with, parse_params, to_json, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::timetable::{SqliteTimetable, TimetableFilter};
use crate::repo::Repository;
use crate::timetable::{day_view, slot_grid, week_layout};
use rusqlite::Connection;
use serde_json::json;

/// `view: "day"` with `day: 1..=7` narrows the result to one day.
fn timetable_week(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filter: TimetableFilter = parse_params(params)?;
    let entries = SqliteTimetable::new(conn).list(&filter)?;
    match params.get("view").and_then(|v| v.as_str()).unwrap_or("week") {
        "week" => Ok(json!({ "days": to_json(&week_layout(&entries))? })),
        "day" => {
            let day = params.get("day").and_then(|v| v.as_u64()).unwrap_or(1);
            let schedule = u8::try_from(day)
                .ok()
                .and_then(|d| day_view(&entries, d))
                .ok_or_else(|| HandlerErr::bad_params("day must be between 1 and 7"))?;
            Ok(json!({ "days": [to_json(&schedule)?] }))
        }
        other => Err(HandlerErr::bad_params(format!("unknown view: {other}"))),
    }
}

fn timetable_grid(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filter: TimetableFilter = parse_params(params)?;
    let entries = SqliteTimetable::new(conn).list(&filter)?;
    Ok(json!({ "slots": to_json(&slot_grid(&entries))? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "timetable.list" => Some(with_db(state, req, |conn, params| {
            list_with(&SqliteTimetable::new(conn), params, "entries")
        })),
        "timetable.create" => Some(with_db(state, req, |conn, params| {
            create_with(&SqliteTimetable::new(conn), params, "entry")
        })),
        "timetable.week" => Some(with_db(state, req, timetable_week)),
        "timetable.grid" => Some(with_db(state, req, timetable_grid)),
        _ => None,
    }
}
