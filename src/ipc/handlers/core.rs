use crate::db;
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, with_db};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match state.select_workspace(&path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => {
            tracing::error!(workspace = %path.display(), error = %e, "failed to open workspace");
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

fn settings_get(conn: &rusqlite::Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = get_required_str(params, "key")?;
    let value = db::settings_get_json(conn, &key)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    Ok(json!({ "key": key, "value": value }))
}

fn settings_set(conn: &rusqlite::Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = get_required_str(params, "key")?;
    let Some(value) = params.get("value") else {
        return Err(HandlerErr::bad_params("missing params.value"));
    };
    db::settings_set_json(conn, &key, value)
        .map_err(|e| HandlerErr::new("db_insert_failed", e.to_string()))?;
    Ok(json!({ "key": key }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "settings.get" => Some(with_db(state, req, settings_get)),
        "settings.set" => Some(with_db(state, req, settings_set)),
        _ => None,
    }
}
