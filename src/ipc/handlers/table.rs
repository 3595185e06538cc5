//! `table.query`: runs the data-table engine over an entity listing or over
//! rows supplied by the caller.

use crate::db;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::parse_params;
use crate::ipc::types::{AppState, Request};
use crate::repo::attendance::SqliteAttendance;
use crate::repo::homework::SqliteHomework;
use crate::repo::students::SqliteStudents;
use crate::repo::submissions::SqliteSubmissions;
use crate::repo::timetable::SqliteTimetable;
use crate::repo::transport::{SqliteAssignments, SqliteBuses, SqliteDrivers, SqliteRoutes};
use crate::repo::{Repository, Tabular};
use crate::table::{Column, Record, TableEngine, TableOptions, TablePage, TableQuery};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::json;

type Loaded = (Vec<Record>, Vec<Column>);

fn tabular<R>(repo: &R, criteria: &serde_json::Value) -> Result<Loaded, HandlerErr>
where
    R: Repository,
    R::Item: Tabular,
    R::Criteria: DeserializeOwned + Default,
{
    let criteria: R::Criteria = parse_params(criteria)?;
    let records = repo.list(&criteria)?.iter().map(Tabular::to_record).collect();
    Ok((records, R::Item::columns()))
}

fn load_source(conn: &Connection, source: &str, criteria: &serde_json::Value) -> Result<Loaded, HandlerErr> {
    match source {
        "students" => tabular(&SqliteStudents::new(conn), criteria),
        "homework" => tabular(&SqliteHomework::new(conn), criteria),
        "homework.submissions" => tabular(&SqliteSubmissions::new(conn), criteria),
        "transport.buses" => tabular(&SqliteBuses::new(conn), criteria),
        "transport.drivers" => tabular(&SqliteDrivers::new(conn), criteria),
        "transport.routes" => tabular(&SqliteRoutes::new(conn), criteria),
        "transport.assignments" => tabular(&SqliteAssignments::new(conn), criteria),
        "timetable" => tabular(&SqliteTimetable::new(conn), criteria),
        "attendance" => tabular(&SqliteAttendance::new(conn), criteria),
        _ => Err(HandlerErr {
            code: "bad_params",
            message: format!("unknown table source: {source}"),
            details: Some(json!({ "source": source })),
        }),
    }
}

fn load_inline(params: &serde_json::Value) -> Result<Loaded, HandlerErr> {
    let Some(rows) = params.get("rows").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("params.rows must be an array"));
    };
    let Some(cols) = params.get("columns").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("params.columns must be an array"));
    };
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Record::from_json(r)
                .ok_or_else(|| HandlerErr::bad_params(format!("rows[{i}] must be an object")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let columns = cols
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Column::from_json(c)
                .ok_or_else(|| HandlerErr::bad_params(format!("columns[{i}] needs a key")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((records, columns))
}

/// Page size saved for this source under `tables.<source>`, if any.
fn saved_page_size(conn: &Connection, source: &str) -> Result<Option<usize>, HandlerErr> {
    let saved = db::settings_get_json(conn, &format!("tables.{source}"))
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    Ok(saved
        .as_ref()
        .and_then(|v| v.get("pageSize"))
        .and_then(|v| v.as_u64())
        .map(|n| n as usize))
}

fn table_query(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let mut query: TableQuery = parse_params(params.get("query").unwrap_or(&serde_json::Value::Null))?;
    let options: TableOptions = parse_params(params.get("options").unwrap_or(&serde_json::Value::Null))?;

    let (records, columns) = match params.get("source").and_then(|v| v.as_str()) {
        Some(source) => {
            let Some(conn) = state.db.as_ref() else {
                return Err(HandlerErr::new("no_workspace", "select a workspace first"));
            };
            if query.page_size.is_none() {
                query.page_size = saved_page_size(conn, source)?;
            }
            let criteria = params.get("criteria").unwrap_or(&serde_json::Value::Null);
            load_source(conn, source, criteria)?
        }
        None => load_inline(params)?,
    };

    let mut engine = TableEngine::with_options(records, columns, options);
    query.apply(&mut engine);
    tracing::debug!(
        rows = engine.records().len(),
        filtered = engine.total_filtered_count(),
        page = engine.current_page(),
        "table query"
    );

    let activated = match params.get("activate").and_then(|v| v.as_u64()) {
        Some(index) => engine
            .activate_row(index as usize)
            .map(Record::to_json)
            .unwrap_or(serde_json::Value::Null),
        None => serde_json::Value::Null,
    };

    let page = TablePage::from_engine(&engine);
    let mut result = serde_json::to_value(&page)
        .map_err(|e| HandlerErr::new("internal", e.to_string()))?;
    result["activated"] = activated;
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "table.query" => Some(match table_query(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        _ => None,
    }
}
