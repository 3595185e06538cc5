use super::validate::{clock_time, lenient_i64, optional, required};
use super::{RepoError, Repository, Result, Tabular};
use crate::table::{Column, Record, Value};
use crate::timetable::{day_name, format_time};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableEntryInput {
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableFilter {
    pub class_id: Option<String>,
    pub teacher_id: Option<String>,
}

fn row_to_entry(r: &Row<'_>) -> rusqlite::Result<TimetableEntry> {
    Ok(TimetableEntry {
        id: r.get(0)?,
        class_id: r.get(1)?,
        subject_id: r.get(2)?,
        teacher_id: r.get(3)?,
        day_of_week: r.get(4)?,
        start_time: r.get(5)?,
        end_time: r.get(6)?,
        room: r.get(7)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, class_id, subject_id, teacher_id, day_of_week, start_time, end_time, room";

pub struct SqliteTimetable<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTimetable<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<TimetableEntry>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM timetable_entries WHERE id = ?");
        Ok(self.conn.query_row(&sql, [id], row_to_entry).optional()?)
    }
}

impl Repository for SqliteTimetable<'_> {
    type Item = TimetableEntry;
    type Criteria = TimetableFilter;
    type Input = TimetableEntryInput;

    fn list(&self, criteria: &TimetableFilter) -> Result<Vec<TimetableEntry>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<SqlValue> = Vec::new();
        if let Some(v) = optional(&criteria.class_id) {
            clauses.push("class_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(v) = optional(&criteria.teacher_id) {
            clauses.push("teacher_id = ?");
            binds.push(SqlValue::Text(v));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM timetable_entries {where_sql}
             ORDER BY day_of_week, start_time"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: TimetableEntryInput) -> Result<TimetableEntry> {
        let class_id = required(&input.class_id, "classId", "Class")?;
        let subject_id = required(&input.subject_id, "subjectId", "Subject")?;
        let teacher_id = required(&input.teacher_id, "teacherId", "Teacher")?;
        let day = input
            .day_of_week
            .filter(|d| (1..=7).contains(d))
            .ok_or_else(|| RepoError::invalid("dayOfWeek", "Day of week must be between 1 and 7"))?;
        let start_time = required(&input.start_time, "startTime", "Start time")?;
        let end_time = required(&input.end_time, "endTime", "End time")?;
        let start = clock_time(&start_time, "startTime")?;
        let end = clock_time(&end_time, "endTime")?;
        if end <= start {
            return Err(RepoError::invalid("endTime", "End time must be after start time"));
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO timetable_entries(
               id, class_id, subject_id, teacher_id, day_of_week, start_time, end_time, room
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id,
                class_id,
                subject_id,
                teacher_id,
                day,
                normalize_clock(start),
                normalize_clock(end),
                optional(&input.room),
            ],
        )?;
        self.get(&id)?.ok_or(RepoError::NotFound("timetable entry"))
    }
}

// Stored zero-padded so lexical order matches clock order.
fn normalize_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

impl Tabular for TimetableEntry {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("day", self.day_of_week as i64)
            .with("subjectId", self.subject_id.as_str())
            .with("teacherId", self.teacher_id.as_str())
            .with("classId", self.class_id.as_str())
            .with("startTime", self.start_time.as_str())
            .with("endTime", self.end_time.as_str())
            .with("room", self.room.clone())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("day", "Day").sortable().cell(|v, _| match v {
                Some(Value::Int(d)) => day_name(*d as u8).unwrap_or("Unknown").to_string(),
                _ => String::new(),
            }),
            Column::new("startTime", "Start")
                .sortable()
                .cell(|v, _| v.map(|v| format_time(&v.display())).unwrap_or_default()),
            Column::new("subjectId", "Subject").sortable().filterable(),
            Column::new("teacherId", "Teacher").filterable(),
            Column::new("room", "Room").filterable(),
        ]
    }
}
