use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "school.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            class_id TEXT NOT NULL,
            section_id TEXT,
            roll_number TEXT NOT NULL,
            admission_number TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            date_of_birth TEXT NOT NULL,
            gender TEXT NOT NULL,
            address TEXT,
            parent_email TEXT,
            admission_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS homework(
            id TEXT PRIMARY KEY,
            class_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            teacher_id TEXT,
            title TEXT NOT NULL,
            description TEXT,
            instructions TEXT,
            due_date TEXT NOT NULL,
            max_marks REAL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_homework_class ON homework(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS homework_submissions(
            id TEXT PRIMARY KEY,
            homework_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            content TEXT,
            status TEXT NOT NULL,
            submitted_at TEXT NOT NULL,
            is_late INTEGER NOT NULL DEFAULT 0,
            grade REAL,
            max_grade REAL,
            feedback TEXT,
            graded_at TEXT,
            graded_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(homework_id, student_id),
            FOREIGN KEY(homework_id) REFERENCES homework(id),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS buses(
            id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL,
            number TEXT NOT NULL,
            registration_number TEXT NOT NULL UNIQUE,
            model TEXT,
            capacity INTEGER NOT NULL,
            manufacturing_year INTEGER,
            fuel_type TEXT,
            insurance_expiry TEXT,
            fitness_expiry TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            UNIQUE(school_id, number)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS drivers(
            id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT,
            license_number TEXT NOT NULL UNIQUE,
            license_expiry TEXT NOT NULL,
            date_of_joining TEXT NOT NULL,
            address TEXT,
            emergency_contact TEXT,
            salary REAL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            UNIQUE(school_id, employee_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS routes(
            id TEXT PRIMARY KEY,
            bus_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            distance REAL,
            estimated_duration INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            FOREIGN KEY(bus_id) REFERENCES buses(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stops(
            id TEXT PRIMARY KEY,
            route_id TEXT NOT NULL,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            arrival_time TEXT NOT NULL,
            sequence INTEGER NOT NULL,
            FOREIGN KEY(route_id) REFERENCES routes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stops_route ON stops(route_id, sequence)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transport_assignments(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            route_id TEXT NOT NULL,
            stop_id TEXT,
            boarding_point TEXT,
            fee_amount REAL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            UNIQUE(student_id, route_id),
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(route_id) REFERENCES routes(id),
            FOREIGN KEY(stop_id) REFERENCES stops(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS timetable_entries(
            id TEXT PRIMARY KEY,
            class_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            day_of_week INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            room TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_timetable_class ON timetable_entries(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_records(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            remarks TEXT,
            marked_at TEXT NOT NULL,
            UNIQUE(student_id, date),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_class_date ON attendance_records(class_id, date)",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}
