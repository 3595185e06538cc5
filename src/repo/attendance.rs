use super::students::SqliteStudents;
use super::validate::{date, optional, required};
use super::{now_stamp, RepoError, Repository, Result, Tabular};
use crate::attendance::AttendanceStatus;
use crate::table::{Column, Record};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceInput {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceFilter {
    pub class_id: Option<String>,
    pub student_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class_id: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub marked_at: String,
}

const SELECT: &str = "SELECT a.id, a.student_id, s.first_name || ' ' || s.last_name,
    a.class_id, a.date, a.status, a.remarks, a.marked_at
    FROM attendance_records a JOIN students s ON s.id = a.student_id";

fn row_to_record(r: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    let status: String = r.get(5)?;
    Ok(AttendanceRecord {
        id: r.get(0)?,
        student_id: r.get(1)?,
        student_name: r.get(2)?,
        class_id: r.get(3)?,
        date: r.get(4)?,
        status: AttendanceStatus::parse(&status).unwrap_or(AttendanceStatus::Absent),
        remarks: r.get(6)?,
        marked_at: r.get(7)?,
    })
}

pub struct SqliteAttendance<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAttendance<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Repository for SqliteAttendance<'_> {
    type Item = AttendanceRecord;
    type Criteria = AttendanceFilter;
    type Input = AttendanceInput;

    fn list(&self, criteria: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<SqlValue> = Vec::new();
        if let Some(v) = optional(&criteria.class_id) {
            clauses.push("a.class_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(v) = optional(&criteria.student_id) {
            clauses.push("a.student_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(v) = optional(&criteria.date_from) {
            clauses.push("a.date >= ?");
            binds.push(SqlValue::Text(date(&v, "dateFrom", "Date from")?.to_string()));
        }
        if let Some(v) = optional(&criteria.date_to) {
            clauses.push("a.date <= ?");
            binds.push(SqlValue::Text(date(&v, "dateTo", "Date to")?.to_string()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!("{SELECT} {where_sql} ORDER BY a.date DESC, s.last_name, s.first_name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Marks one student for one day. Re-marking the same day replaces
    /// the previous status.
    fn create(&self, input: AttendanceInput) -> Result<AttendanceRecord> {
        let student_id = required(&input.student_id, "studentId", "Student")?;
        let class_id = required(&input.class_id, "classId", "Class")?;
        let day = required(&input.date, "date", "Date")?;
        let day = date(&day, "date", "Date")?.to_string();
        let status_raw = required(&input.status, "status", "Status")?;
        let status = AttendanceStatus::parse(&status_raw).ok_or_else(|| {
            RepoError::invalid(
                "status",
                "Status must be PRESENT, ABSENT, LATE, HALF_DAY or EXCUSED",
            )
        })?;
        if !SqliteStudents::new(self.conn).exists(&student_id)? {
            return Err(RepoError::NotFound("student"));
        }

        self.conn.execute(
            "INSERT INTO attendance_records(id, student_id, class_id, date, status, remarks, marked_at)
             VALUES(?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(student_id, date) DO UPDATE SET
               class_id = excluded.class_id,
               status = excluded.status,
               remarks = excluded.remarks,
               marked_at = excluded.marked_at",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                student_id,
                class_id,
                day,
                status.as_str(),
                optional(&input.remarks),
                now_stamp(),
            ],
        )?;
        tracing::debug!(student_id = %student_id, date = %day, status = status.as_str(), "attendance marked");

        let sql = format!("{SELECT} WHERE a.student_id = ? AND a.date = ?");
        Ok(self
            .conn
            .query_row(&sql, (&student_id, &day), row_to_record)?)
    }
}

impl Tabular for AttendanceRecord {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("studentName", self.student_name.as_str())
            .with("classId", self.class_id.as_str())
            .with("date", self.date.as_str())
            .with("status", self.status.as_str())
            .with("remarks", self.remarks.clone())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("date", "Date").sortable(),
            Column::new("studentName", "Student").sortable(),
            Column::new("status", "Status").sortable().filterable(),
            Column::new("classId", "Class").filterable(),
            Column::new("remarks", "Remarks"),
        ]
    }
}
