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


const NAMES: [(&str, &str, Option<&str>); 8] = [
    ("Alice", "10A", Some("S1")),
    ("Bruno", "10A", None),
    ("Chen", "10A", Some("S2")),
    ("Dmitri", "10A", None),
    ("Esme", "10A", Some("S1")),
    ("Farah", "10B", None),
    ("Goran", "10B", Some("S1")),
    ("Hiro", "10B", None),
];

fn seed_students(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) {
    for (i, (first, class, section)) in NAMES.iter().enumerate() {
        let resp = request(
            stdin,
            reader,
            &format!("seed{i}"),
            "students.create",
            json!({
                "firstName": first,
                "lastName": "Doe",
                "email": format!("{}@school.edu", first.to_lowercase()),
                "dateOfBirth": "2010-04-12",
                "gender": if i % 2 == 0 { "FEMALE" } else { "MALE" },
                "classId": class,
                "sectionId": section,
                "rollNumber": format!("{:02}", i + 1),
                "admissionNumber": format!("ADM-{:03}", i + 1),
                "admissionDate": "2023-06-01",
            }),
        );
        assert_eq!(resp["ok"], json!(true), "seed {first}: {resp}");
    }
}

fn names(page: &serde_json::Value) -> Vec<String> {
    page["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|r| r["cells"]["name"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn students_table_search_filter_sort_paginate() {
    let workspace = temp_dir("schoold-students-table");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    seed_students(&mut stdin, &mut reader);

    let first = request(
        &mut stdin,
        &mut reader,
        "q1",
        "table.query",
        json!({ "source": "students", "query": { "pageSize": 5 } }),
    );
    let page = &first["result"];
    assert_eq!(page["totalFilteredCount"], json!(8));
    assert_eq!(page["totalPages"], json!(2));
    assert_eq!(page["currentPage"], json!(1));
    assert_eq!(page["summary"], json!("8 Results"));
    assert_eq!(page["pageSizeOptions"], json!([5, 10, 20, 50]));
    assert_eq!(names(page).len(), 5);
    assert_eq!(page["filterOptions"]["classId"], json!(["10A", "10B"]));
    assert_eq!(page["filterOptions"]["sectionId"], json!(["S1", "S2"]));
    assert_eq!(page["rows"][0]["cells"]["isActive"], json!("Active"));

    let searched = request(
        &mut stdin,
        &mut reader,
        "q2",
        "table.query",
        json!({ "source": "students", "query": { "search": "GORAN" } }),
    );
    assert_eq!(names(&searched["result"]), vec!["Goran Doe"]);
    assert_eq!(searched["result"]["summary"], json!("1 Result for \"GORAN\""));

    let class_b = request(
        &mut stdin,
        &mut reader,
        "q3",
        "table.query",
        json!({
            "source": "students",
            "query": {
                "filters": { "classId": "10B" },
                "sortKey": "name",
                "sortDirection": "desc"
            }
        }),
    );
    assert_eq!(names(&class_b["result"]), vec!["Hiro Doe", "Goran Doe", "Farah Doe"]);

    let no_section = request(
        &mut stdin,
        &mut reader,
        "q4",
        "table.query",
        json!({
            "source": "students",
            "query": { "filters": { "sectionId": "__empty__", "classId": "all" } }
        }),
    );
    assert_eq!(
        names(&no_section["result"]),
        vec!["Bruno Doe", "Dmitri Doe", "Farah Doe", "Hiro Doe"]
    );

    let clamped = request(
        &mut stdin,
        &mut reader,
        "q5",
        "table.query",
        json!({ "source": "students", "query": { "pageSize": 5, "page": 99 } }),
    );
    assert_eq!(clamped["result"]["currentPage"], json!(2));
    assert_eq!(names(&clamped["result"]), vec!["Farah Doe", "Goran Doe", "Hiro Doe"]);

    let criteria = request(
        &mut stdin,
        &mut reader,
        "q6",
        "table.query",
        json!({ "source": "students", "criteria": { "classId": "10A" } }),
    );
    assert_eq!(criteria["result"]["totalFilteredCount"], json!(5));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn saved_page_size_applies_when_query_omits_it() {
    let workspace = temp_dir("schoold-table-settings");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    seed_students(&mut stdin, &mut reader);

    let _ = request(
        &mut stdin,
        &mut reader,
        "set",
        "settings.set",
        json!({ "key": "tables.students", "value": { "pageSize": 5 } }),
    );
    let saved = request(&mut stdin, &mut reader, "q1", "table.query", json!({ "source": "students" }));
    assert_eq!(saved["result"]["pageSize"], json!(5));
    assert_eq!(saved["result"]["totalPages"], json!(2));

    let explicit = request(
        &mut stdin,
        &mut reader,
        "q2",
        "table.query",
        json!({ "source": "students", "query": { "pageSize": 20 } }),
    );
    assert_eq!(explicit["result"]["pageSize"], json!(20));
    assert_eq!(explicit["result"]["totalPages"], json!(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn caller_rows_need_no_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "table.query",
        json!({
            "rows": [
                { "name": "Ann", "bus": "B1" },
                { "name": "Ben", "bus": null },
                { "name": "Cal" },
                { "name": "Dee", "bus": "B2" }
            ],
            "columns": [
                { "key": "name", "header": "Name", "sortable": true },
                { "key": "bus", "header": "Bus", "filterable": true }
            ],
            "query": { "filters": { "bus": "__empty__" } },
            "activate": 1
        }),
    );
    assert_eq!(resp["ok"], json!(true), "{resp}");
    let page = &resp["result"];
    assert_eq!(page["totalFilteredCount"], json!(2));
    assert_eq!(page["filterOptions"]["bus"], json!(["B1", "B2"]));
    assert_eq!(page["rows"][0]["cells"]["bus"], json!(""));
    assert_eq!(page["activated"]["name"], json!("Cal"));

    let off = request(
        &mut stdin,
        &mut reader,
        "2",
        "table.query",
        json!({
            "rows": [{ "name": "Ann" }, { "name": "Ben" }],
            "columns": [{ "key": "name" }],
            "options": { "searchable": false },
            "query": { "search": "zzz" }
        }),
    );
    assert_eq!(off["result"]["totalFilteredCount"], json!(2));
    assert_eq!(off["result"]["summary"], json!("2 Results"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "3",
        "table.query",
        json!({ "rows": [1, 2], "columns": [] }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    let unknown = request(&mut stdin, &mut reader, "4", "table.query", json!({ "source": "payroll" }));
    assert_eq!(error_code(&unknown), Some("no_workspace"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn student_registration_errors() {
    let workspace = temp_dir("schoold-student-errors");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    seed_students(&mut stdin, &mut reader);

    let dup = request(
        &mut stdin,
        &mut reader,
        "dup",
        "students.create",
        json!({
            "firstName": "Ivy",
            "lastName": "Doe",
            "email": "ivy@school.edu",
            "dateOfBirth": "2010-01-01",
            "gender": "FEMALE",
            "classId": "10A",
            "rollNumber": "09",
            "admissionNumber": "ADM-001",
            "admissionDate": "2023-06-01"
        }),
    );
    assert_eq!(error_code(&dup), Some("conflict"));
    assert_eq!(dup["error"]["message"], json!("Admission number already exists"));

    let bad_email = request(
        &mut stdin,
        &mut reader,
        "email",
        "students.create",
        json!({
            "firstName": "Ivy",
            "lastName": "Doe",
            "email": "not-an-email",
            "dateOfBirth": "2010-01-01",
            "gender": "FEMALE",
            "classId": "10A",
            "rollNumber": "09",
            "admissionNumber": "ADM-009",
            "admissionDate": "2023-06-01"
        }),
    );
    assert_eq!(error_code(&bad_email), Some("bad_params"));
    assert_eq!(bad_email["error"]["details"]["field"], json!("email"));

    let listed = request(
        &mut stdin,
        &mut reader,
        "list",
        "students.list",
        json!({ "search": "chen" }),
    );
    let students = listed["result"]["students"].as_array().expect("students");
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["firstName"], json!("Chen"));

    drop(stdin);
    let _ = child.wait();
}
