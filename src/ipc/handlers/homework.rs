use crate::ipc::helpers::{create_with, list_with, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::homework::SqliteHomework;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "homework.list" => Some(with_db(state, req, |conn, params| {
            list_with(&SqliteHomework::new(conn), params, "homework")
        })),
        "homework.create" => Some(with_db(state, req, |conn, params| {
            create_with(&SqliteHomework::new(conn), params, "homework")
        })),
        _ => None,
    }
}
