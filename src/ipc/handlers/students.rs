use crate::ipc::helpers::{create_with, list_with, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::students::SqliteStudents;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_db(state, req, |conn, params| {
            list_with(&SqliteStudents::new(conn), params, "students")
        })),
        "students.create" => Some(with_db(state, req, |conn, params| {
            create_with(&SqliteStudents::new(conn), params, "student")
        })),
        _ => None,
    }
}
