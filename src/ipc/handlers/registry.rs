use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::nav;
use crate::registry::{self, ModuleStatus, MODULES};
use serde_json::json;

fn modules_list(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let modules = match params.get("status").and_then(|v| v.as_str()) {
        Some(s) => {
            let status = ModuleStatus::parse(s).ok_or_else(|| {
                HandlerErr::bad_params("status must be TODO, IN_PROGRESS or COMPLETED")
            })?;
            registry::modules_by_status(status)
        }
        None => MODULES.iter().collect(),
    };
    Ok(json!({
        "modules": to_json(&modules)?,
        "totalProgress": registry::total_progress(),
    }))
}

fn modules_get(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let module = registry::get_module_by_id(&id).ok_or_else(|| HandlerErr {
        code: "not_found",
        message: "module not found".to_string(),
        details: Some(json!({ "id": id })),
    })?;
    Ok(json!({ "module": to_json(module)? }))
}

fn nav_resolve(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let route = get_required_str(params, "route")?;
    let set = params.get("nav").and_then(|v| v.as_str()).unwrap_or("dashboard");
    let items = nav::nav_set(set)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown nav set: {set}")))?;
    Ok(json!({
        "items": to_json(&nav::resolve(items, &route))?,
        "title": nav::page_title(items, &route),
    }))
}

fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "modules.list" => Some(respond(req, modules_list(&req.params))),
        "modules.get" => Some(respond(req, modules_get(&req.params))),
        "nav.resolve" => Some(respond(req, nav_resolve(&req.params))),
        _ => None,
    }
}
