use super::validate::{instant, length, lenient_f64, optional, required};
use super::{now_stamp, RepoError, Repository, Result, Tabular};
use crate::table::{Column, Record, Value};
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeworkInput {
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub max_marks: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub id: String,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: String,
    pub max_marks: Option<f64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeworkFilter {
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
}

fn row_to_homework(r: &Row<'_>) -> rusqlite::Result<Homework> {
    Ok(Homework {
        id: r.get(0)?,
        class_id: r.get(1)?,
        subject_id: r.get(2)?,
        teacher_id: r.get(3)?,
        title: r.get(4)?,
        description: r.get(5)?,
        instructions: r.get(6)?,
        due_date: r.get(7)?,
        max_marks: r.get(8)?,
        created_at: r.get(9)?,
    })
}

const SELECT_COLUMNS: &str = "id, class_id, subject_id, teacher_id, title, description,
    instructions, due_date, max_marks, created_at";

pub struct SqliteHomework<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteHomework<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<Homework>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM homework WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], row_to_homework)
            .optional()?)
    }
}

impl Repository for SqliteHomework<'_> {
    type Item = Homework;
    type Criteria = HomeworkFilter;
    type Input = HomeworkInput;

    fn list(&self, criteria: &HomeworkFilter) -> Result<Vec<Homework>> {
        let mut clauses = vec!["is_active = 1"];
        let mut binds: Vec<SqlValue> = Vec::new();
        for (col, v) in [
            ("class_id = ?", &criteria.class_id),
            ("subject_id = ?", &criteria.subject_id),
            ("teacher_id = ?", &criteria.teacher_id),
        ] {
            if let Some(v) = optional(v) {
                clauses.push(col);
                binds.push(SqlValue::Text(v));
            }
        }
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM homework WHERE {} ORDER BY due_date, title",
            clauses.join(" AND ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_homework)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: HomeworkInput) -> Result<Homework> {
        let class_id = required(&input.class_id, "classId", "Class")?;
        let subject_id = required(&input.subject_id, "subjectId", "Subject")?;
        let title = required(&input.title, "title", "Title")?;
        length(&title, "title", "Title", 3, 100)?;
        let due_raw = required(&input.due_date, "dueDate", "Due date")?;
        let due = instant(&due_raw, "dueDate", "Due date")?;
        if due <= Utc::now() {
            return Err(RepoError::invalid("dueDate", "Due date must be in the future"));
        }
        if let Some(m) = input.max_marks {
            if m <= 0.0 {
                return Err(RepoError::invalid("maxMarks", "Max marks must be positive"));
            }
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO homework(
               id, class_id, subject_id, teacher_id, title, description,
               instructions, due_date, max_marks, is_active, created_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
            rusqlite::params![
                id,
                class_id,
                subject_id,
                optional(&input.teacher_id),
                title,
                optional(&input.description),
                optional(&input.instructions),
                due.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                input.max_marks,
                now_stamp(),
            ],
        )?;
        tracing::info!(homework_id = %id, class_id = %class_id, "homework created");
        self.get(&id)?.ok_or(RepoError::NotFound("homework"))
    }
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Whole days left before `due`, rounded up; `None` once it has passed.
pub fn days_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    let left = (due - now).num_milliseconds();
    if left < 0 {
        return None;
    }
    Some((left + DAY_MS - 1) / DAY_MS)
}

pub fn due_status(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match days_until_due(due, now) {
        None => "Overdue".to_string(),
        Some(0) => "Due Today".to_string(),
        Some(1) => "Due Tomorrow".to_string(),
        Some(n) => format!("{n} days left"),
    }
}

impl Homework {
    pub fn due_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.due_date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Table row with the due status evaluated at `now`.
    pub fn record_at(&self, now: DateTime<Utc>) -> Record {
        let due = self.due_instant();
        Record::new()
            .with("id", self.id.as_str())
            .with("title", self.title.as_str())
            .with("classId", self.class_id.as_str())
            .with("subjectId", self.subject_id.as_str())
            .with("teacherId", self.teacher_id.clone())
            .with("dueDate", self.due_date.as_str())
            .with("maxMarks", self.max_marks)
            .with("daysUntilDue", due.and_then(|d| days_until_due(d, now)))
            .with("dueStatus", due.map(|d| due_status(d, now)))
    }
}

impl Tabular for Homework {
    fn to_record(&self) -> Record {
        self.record_at(Utc::now())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("title", "Title").sortable(),
            Column::new("subjectId", "Subject").sortable().filterable(),
            Column::new("classId", "Class").filterable(),
            Column::new("dueDate", "Due").sortable().cell(|v, _| {
                v.map(Value::display)
                    .map(|s| s.get(..10).unwrap_or(&s).to_string())
                    .unwrap_or_default()
            }),
            Column::new("maxMarks", "Max Marks").sortable(),
            Column::new("dueStatus", "Status").sortable().filterable(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> Connection {
        let dir = std::env::temp_dir().join(format!("schoold-homework-{}", Uuid::new_v4()));
        crate::db::open_db(&dir).expect("open db")
    }

    fn input(title: &str, due: &str) -> HomeworkInput {
        HomeworkInput {
            class_id: Some("class-10a".into()),
            subject_id: Some("math".into()),
            title: Some(title.into()),
            due_date: Some(due.into()),
            max_marks: Some(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn past_due_date_is_rejected() {
        let conn = temp_db();
        let repo = SqliteHomework::new(&conn);
        let err = repo.create(input("Chapter 5", "2001-01-01")).unwrap_err();
        assert_eq!(err.to_string(), "Due date must be in the future");
    }

    #[test]
    fn listed_by_due_date() {
        let conn = temp_db();
        let repo = SqliteHomework::new(&conn);
        repo.create(input("Later", "2099-06-01")).expect("later");
        repo.create(input("Sooner", "2099-01-01")).expect("sooner");
        let rows = repo.list(&HomeworkFilter::default()).expect("list");
        let titles: Vec<_> = rows.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[test]
    fn max_marks_accepts_numeric_strings() {
        let parsed: HomeworkInput =
            serde_json::from_value(serde_json::json!({ "maxMarks": "50" })).expect("parse");
        assert_eq!(parsed.max_marks, Some(50.0));
        let parsed: HomeworkInput =
            serde_json::from_value(serde_json::json!({ "maxMarks": null })).expect("parse");
        assert_eq!(parsed.max_marks, None);
    }

    #[test]
    fn due_status_labels() {
        let now = DateTime::parse_from_rfc3339("2030-03-10T09:00:00Z")
            .expect("now")
            .with_timezone(&Utc);
        let at = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .expect("due")
                .with_timezone(&Utc)
        };
        assert_eq!(due_status(at("2030-03-10T08:59:59Z"), now), "Overdue");
        assert_eq!(due_status(now, now), "Due Today");
        assert_eq!(due_status(at("2030-03-10T17:00:00Z"), now), "Due Tomorrow");
        assert_eq!(due_status(at("2030-03-11T09:00:00Z"), now), "Due Tomorrow");
        assert_eq!(due_status(at("2030-03-11T09:00:01Z"), now), "2 days left");
        assert_eq!(due_status(at("2030-03-15T00:00:00Z"), now), "5 days left");
    }

    #[test]
    fn record_carries_due_status() {
        let conn = temp_db();
        let hw = SqliteHomework::new(&conn)
            .create(input("Essay", "2099-06-01"))
            .expect("create");
        let due = hw.due_instant().expect("rfc3339 due date");
        let week_before = due - chrono::Duration::days(7);
        let rec = hw.record_at(week_before);
        assert_eq!(rec.get("dueStatus"), Some(&Value::Text("7 days left".into())));
        assert_eq!(rec.get("daysUntilDue"), Some(&Value::Int(7)));

        let after = hw.record_at(due + chrono::Duration::hours(1));
        assert_eq!(after.get("dueStatus"), Some(&Value::Text("Overdue".into())));
        assert_eq!(after.get("daysUntilDue"), Some(&Value::Null));
    }
}
