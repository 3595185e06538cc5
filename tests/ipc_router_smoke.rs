use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .env_remove("SCHOOLD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_reply(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_reply(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

fn error_code(v: &serde_json::Value) -> Option<&str> {
    v.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
}

#[test]
fn data_methods_require_a_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["workspacePath"], serde_json::Value::Null);

    for (i, method) in [
        "students.list",
        "homework.list",
        "transport.buses.list",
        "timetable.week",
        "attendance.list",
        "settings.get",
    ]
    .iter()
    .enumerate()
    {
        let resp = request(&mut stdin, &mut reader, &format!("nw{i}"), method, json!({}));
        assert_eq!(error_code(&resp), Some("no_workspace"), "{method}");
    }

    let resp = request(
        &mut stdin,
        &mut reader,
        "t1",
        "table.query",
        json!({ "source": "students" }),
    );
    assert_eq!(error_code(&resp), Some("no_workspace"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("schoold-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let selected = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["ok"], json!(true));
    assert!(workspace.join("school.sqlite3").exists());

    let calls = [
        ("students.list", json!({})),
        ("homework.list", json!({})),
        ("transport.buses.list", json!({ "schoolId": "s1" })),
        ("transport.drivers.list", json!({ "schoolId": "s1" })),
        ("transport.routes.list", json!({ "schoolId": "s1" })),
        ("transport.assignments.list", json!({ "schoolId": "s1" })),
        ("timetable.list", json!({})),
        ("timetable.week", json!({ "classId": "c1" })),
        ("attendance.list", json!({})),
        ("attendance.summary", json!({ "classId": "c1" })),
        ("table.query", json!({ "source": "homework" })),
        ("modules.list", json!({})),
        ("modules.get", json!({ "id": "fee-management" })),
        ("nav.resolve", json!({ "route": "/dashboard" })),
        ("settings.set", json!({ "key": "ui.theme", "value": { "dark": true } })),
        ("settings.get", json!({ "key": "ui.theme" })),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &format!("c{i}"), method, params);
        assert_eq!(resp["ok"], json!(true), "{method}: {resp}");
    }

    let theme = request(&mut stdin, &mut reader, "s", "settings.get", json!({ "key": "ui.theme" }));
    assert_eq!(theme["result"]["value"]["dark"], json!(true));

    let unknown = request(&mut stdin, &mut reader, "u", "payroll.run", json!({}));
    assert_eq!(unknown["ok"], json!(false));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let bad = read_reply(&mut reader);
    assert_eq!(error_code(&bad), Some("bad_json"));

    // The loop keeps serving after a bad line.
    let health = request(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(
        health["result"]["workspacePath"].as_str(),
        Some(workspace.to_string_lossy().as_ref())
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn startup_workspace_comes_from_environment() {
    let workspace = temp_dir("schoold-env-workspace");
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .env("SCHOOLD_WORKSPACE", &workspace)
        .env("SCHOOLD_LOG", "debug")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));

    let resp = request(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(resp["ok"], json!(true));
    assert_eq!(resp["result"]["students"], json!([]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn registry_and_navigation() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let all = request(&mut stdin, &mut reader, "1", "modules.list", json!({}));
    assert_eq!(all["result"]["modules"].as_array().map(|a| a.len()), Some(8));
    assert_eq!(all["result"]["totalProgress"], json!(6.25));

    let in_progress = request(
        &mut stdin,
        &mut reader,
        "2",
        "modules.list",
        json!({ "status": "IN_PROGRESS" }),
    );
    assert_eq!(in_progress["result"]["modules"].as_array().map(|a| a.len()), Some(2));

    let bad_status = request(&mut stdin, &mut reader, "3", "modules.list", json!({ "status": "DONE" }));
    assert_eq!(error_code(&bad_status), Some("bad_params"));

    let missing = request(&mut stdin, &mut reader, "4", "modules.get", json!({ "id": "payroll" }));
    assert_eq!(error_code(&missing), Some("not_found"));

    let sis = request(
        &mut stdin,
        &mut reader,
        "5",
        "modules.get",
        json!({ "id": "student-information-system" }),
    );
    assert_eq!(sis["result"]["module"]["status"], json!("IN_PROGRESS"));
    assert_eq!(sis["result"]["module"]["progress"], json!(35));

    let nav = request(
        &mut stdin,
        &mut reader,
        "6",
        "nav.resolve",
        json!({ "nav": "transport", "route": "/dashboard/transport/routes" }),
    );
    assert_eq!(nav["result"]["title"], json!("Routes"));
    let active: Vec<&str> = nav["result"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter(|i| i["active"] == json!(true))
        .filter_map(|i| i["name"].as_str())
        .collect();
    assert_eq!(active, vec!["Routes"]);

    let fallback = request(
        &mut stdin,
        &mut reader,
        "7",
        "nav.resolve",
        json!({ "route": "/dashboard/nowhere" }),
    );
    assert_eq!(fallback["result"]["title"], json!("Dashboard"));

    drop(stdin);
    let _ = child.wait();
}
