use crate::ipc::helpers::{create_with, list_with, with_db};
use crate::ipc::types::{AppState, Request};
use crate::repo::transport::{SqliteAssignments, SqliteBuses, SqliteDrivers, SqliteRoutes};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "transport.buses.list" => with_db(state, req, |conn, params| {
            list_with(&SqliteBuses::new(conn), params, "buses")
        }),
        "transport.buses.create" => with_db(state, req, |conn, params| {
            create_with(&SqliteBuses::new(conn), params, "bus")
        }),
        "transport.drivers.list" => with_db(state, req, |conn, params| {
            list_with(&SqliteDrivers::new(conn), params, "drivers")
        }),
        "transport.drivers.create" => with_db(state, req, |conn, params| {
            create_with(&SqliteDrivers::new(conn), params, "driver")
        }),
        "transport.routes.list" => with_db(state, req, |conn, params| {
            list_with(&SqliteRoutes::new(conn), params, "routes")
        }),
        "transport.routes.create" => with_db(state, req, |conn, params| {
            create_with(&SqliteRoutes::new(conn), params, "route")
        }),
        "transport.assignments.list" => with_db(state, req, |conn, params| {
            list_with(&SqliteAssignments::new(conn), params, "assignments")
        }),
        "transport.assignments.create" => with_db(state, req, |conn, params| {
            create_with(&SqliteAssignments::new(conn), params, "assignment")
        }),
        _ => return None,
    };
    Some(resp)
}
