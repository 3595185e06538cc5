use super::error::{err, ok, HandlerErr};
use super::types::{AppState, Request};
use crate::repo::Repository;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Deserializes `params`, treating a missing or null object as all-defaults.
pub fn parse_params<T>(params: &serde_json::Value) -> Result<T, HandlerErr>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone()).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{key}")))
}

pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr::new("internal", e.to_string()))
}

/// Runs `f` against the open workspace, or answers `no_workspace`.
pub fn with_db<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&Connection, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => {
            tracing::debug!(method = %req.method, code = error.code, "request failed");
            error.response(&req.id)
        }
    }
}

pub fn list_with<R>(repo: &R, params: &serde_json::Value, key: &str) -> Result<serde_json::Value, HandlerErr>
where
    R: Repository,
    R::Criteria: DeserializeOwned + Default,
    R::Item: Serialize,
{
    let criteria: R::Criteria = parse_params(params)?;
    let items = repo.list(&criteria)?;
    Ok(json!({ key: to_json(&items)? }))
}

pub fn create_with<R>(repo: &R, params: &serde_json::Value, key: &str) -> Result<serde_json::Value, HandlerErr>
where
    R: Repository,
    R::Input: DeserializeOwned + Default,
    R::Item: Serialize,
{
    let input: R::Input = parse_params(params)?;
    let item = repo.create(input).map_err(HandlerErr::from_write)?;
    Ok(json!({ key: to_json(&item)? }))
}
