use super::homework::SqliteHomework;
use super::students::SqliteStudents;
use super::validate::{lenient_f64, optional, required};
use super::{now_stamp, RepoError, Repository, Result, Tabular};
use crate::grades::{letter_grade, percentage};
use crate::table::{Column, Record, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HomeworkStatus {
    Pending,
    Submitted,
    Graded,
    Returned,
    LateSubmission,
}

impl HomeworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Pending => "PENDING",
            HomeworkStatus::Submitted => "SUBMITTED",
            HomeworkStatus::Graded => "GRADED",
            HomeworkStatus::Returned => "RETURNED",
            HomeworkStatus::LateSubmission => "LATE_SUBMISSION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(HomeworkStatus::Pending),
            "SUBMITTED" => Some(HomeworkStatus::Submitted),
            "GRADED" => Some(HomeworkStatus::Graded),
            "RETURNED" => Some(HomeworkStatus::Returned),
            "LATE_SUBMISSION" => Some(HomeworkStatus::LateSubmission),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionInput {
    pub homework_id: Option<String>,
    pub student_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeInput {
    pub homework_submission_id: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub grade: Option<f64>,
    /// Falls back to the homework's max marks.
    #[serde(deserialize_with = "lenient_f64")]
    pub max_grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionFilter {
    pub homework_id: Option<String>,
    pub student_id: Option<String>,
    pub subject_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkSubmission {
    pub id: String,
    pub homework_id: String,
    pub homework_title: String,
    pub subject_id: String,
    pub student_id: String,
    pub student_name: String,
    pub content: Option<String>,
    pub status: HomeworkStatus,
    pub submitted_at: String,
    pub is_late: bool,
    pub grade: Option<f64>,
    pub max_grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_at: Option<String>,
    pub graded_by: Option<String>,
    pub percentage: Option<f64>,
    pub letter_grade: Option<&'static str>,
}

const SELECT: &str = "SELECT s.id, s.homework_id, h.title, h.subject_id, s.student_id,
    st.first_name || ' ' || st.last_name, s.content, s.status, s.submitted_at, s.is_late,
    s.grade, s.max_grade, s.feedback, s.graded_at, s.graded_by
    FROM homework_submissions s
    JOIN homework h ON h.id = s.homework_id
    JOIN students st ON st.id = s.student_id";

fn row_to_submission(r: &Row<'_>) -> rusqlite::Result<HomeworkSubmission> {
    let status: String = r.get(7)?;
    let grade: Option<f64> = r.get(10)?;
    let max_grade: Option<f64> = r.get(11)?;
    let pct = grade.zip(max_grade).and_then(|(g, m)| percentage(g, m));
    Ok(HomeworkSubmission {
        id: r.get(0)?,
        homework_id: r.get(1)?,
        homework_title: r.get(2)?,
        subject_id: r.get(3)?,
        student_id: r.get(4)?,
        student_name: r.get(5)?,
        content: r.get(6)?,
        status: HomeworkStatus::parse(&status).unwrap_or(HomeworkStatus::Pending),
        submitted_at: r.get(8)?,
        is_late: r.get::<_, i64>(9)? != 0,
        grade,
        max_grade,
        feedback: r.get(12)?,
        graded_at: r.get(13)?,
        graded_by: r.get(14)?,
        percentage: pct,
        letter_grade: pct.map(letter_grade),
    })
}

fn stamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct SqliteSubmissions<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSubmissions<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<HomeworkSubmission>> {
        let sql = format!("{SELECT} WHERE s.id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], row_to_submission)
            .optional()?)
    }

    /// Records a hand-in at `now`. Handing in again before grading
    /// replaces the content; after grading it is a conflict.
    pub fn submit_at(&self, input: SubmissionInput, now: DateTime<Utc>) -> Result<HomeworkSubmission> {
        let homework_id = required(&input.homework_id, "homeworkId", "Homework")?;
        let student_id = required(&input.student_id, "studentId", "Student")?;
        let homework = SqliteHomework::new(self.conn)
            .get(&homework_id)?
            .ok_or(RepoError::NotFound("homework"))?;
        if !SqliteStudents::new(self.conn).exists(&student_id)? {
            return Err(RepoError::NotFound("student"));
        }

        let previous: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM homework_submissions WHERE homework_id = ? AND student_id = ?",
                (&homework_id, &student_id),
                |r| r.get(0),
            )
            .optional()?;
        if previous.as_deref() == Some(HomeworkStatus::Graded.as_str()) {
            return Err(RepoError::Conflict(
                "Submission has already been graded".to_string(),
            ));
        }

        let is_late = homework.due_instant().is_some_and(|due| now > due);
        let status = if is_late {
            HomeworkStatus::LateSubmission
        } else {
            HomeworkStatus::Submitted
        };
        let at = stamp(now);
        self.conn.execute(
            "INSERT INTO homework_submissions(
               id, homework_id, student_id, content, status, submitted_at, is_late,
               created_at, updated_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(homework_id, student_id) DO UPDATE SET
               content = excluded.content,
               status = excluded.status,
               submitted_at = excluded.submitted_at,
               is_late = excluded.is_late,
               updated_at = excluded.updated_at",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                homework_id,
                student_id,
                optional(&input.content),
                status.as_str(),
                at,
                is_late as i64,
                at,
                at,
            ],
        )?;
        tracing::info!(homework_id = %homework_id, student_id = %student_id, is_late, "homework submitted");

        let sql = format!("{SELECT} WHERE s.homework_id = ? AND s.student_id = ?");
        Ok(self
            .conn
            .query_row(&sql, (&homework_id, &student_id), row_to_submission)?)
    }

    pub fn grade(&self, input: GradeInput) -> Result<HomeworkSubmission> {
        let id = required(&input.homework_submission_id, "homeworkSubmissionId", "Submission")?;
        let grade = input
            .grade
            .ok_or_else(|| RepoError::invalid("grade", "Grade is required"))?;
        let submission = self.get(&id)?.ok_or(RepoError::NotFound("submission"))?;
        let max_grade = match input.max_grade {
            Some(m) => m,
            None => SqliteHomework::new(self.conn)
                .get(&submission.homework_id)?
                .and_then(|h| h.max_marks)
                .ok_or_else(|| RepoError::invalid("maxGrade", "Max grade is required"))?,
        };
        if max_grade <= 0.0 {
            return Err(RepoError::invalid("maxGrade", "Max grade must be positive"));
        }
        if grade < 0.0 {
            return Err(RepoError::invalid("grade", "Grade cannot be negative"));
        }
        if grade > max_grade {
            return Err(RepoError::invalid("grade", "Grade cannot exceed max grade"));
        }

        let now = now_stamp();
        self.conn.execute(
            "UPDATE homework_submissions
             SET grade = ?, max_grade = ?, feedback = ?, graded_by = ?, graded_at = ?,
                 status = ?, updated_at = ?
             WHERE id = ?",
            rusqlite::params![
                grade,
                max_grade,
                optional(&input.feedback),
                optional(&input.graded_by),
                now,
                HomeworkStatus::Graded.as_str(),
                now,
                id,
            ],
        )?;
        tracing::info!(submission_id = %id, grade, max_grade, "submission graded");
        self.get(&id)?.ok_or(RepoError::NotFound("submission"))
    }

    /// Graded submissions in the order they were graded.
    pub fn graded(&self, filter: &SubmissionFilter) -> Result<Vec<HomeworkSubmission>> {
        let mut filter = filter.clone();
        filter.status = Some(HomeworkStatus::Graded.as_str().to_string());
        let mut rows = self.list(&filter)?;
        rows.sort_by(|a, b| a.graded_at.cmp(&b.graded_at));
        Ok(rows)
    }
}

impl Repository for SqliteSubmissions<'_> {
    type Item = HomeworkSubmission;
    type Criteria = SubmissionFilter;
    type Input = SubmissionInput;

    fn list(&self, criteria: &SubmissionFilter) -> Result<Vec<HomeworkSubmission>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<SqlValue> = Vec::new();
        for (col, v) in [
            ("s.homework_id = ?", &criteria.homework_id),
            ("s.student_id = ?", &criteria.student_id),
            ("h.subject_id = ?", &criteria.subject_id),
        ] {
            if let Some(v) = optional(v) {
                clauses.push(col);
                binds.push(SqlValue::Text(v));
            }
        }
        if let Some(raw) = optional(&criteria.status) {
            let status = HomeworkStatus::parse(&raw)
                .ok_or_else(|| RepoError::invalid("status", "Unknown homework status"))?;
            clauses.push("s.status = ?");
            binds.push(SqlValue::Text(status.as_str().to_string()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!("{SELECT} {where_sql} ORDER BY s.submitted_at, s.rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_submission)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: SubmissionInput) -> Result<HomeworkSubmission> {
        self.submit_at(input, Utc::now())
    }
}

impl Tabular for HomeworkSubmission {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("studentName", self.student_name.as_str())
            .with("homeworkTitle", self.homework_title.as_str())
            .with("subjectId", self.subject_id.as_str())
            .with("status", self.status.as_str())
            .with("submittedAt", self.submitted_at.as_str())
            .with("isLate", self.is_late)
            .with("grade", self.grade)
            .with("maxGrade", self.max_grade)
            .with("percentage", self.percentage)
            .with("letterGrade", self.letter_grade)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("studentName", "Student").sortable(),
            Column::new("homeworkTitle", "Homework").sortable().filterable(),
            Column::new("status", "Status").sortable().filterable(),
            Column::new("submittedAt", "Submitted").sortable(),
            Column::new("isLate", "Late")
                .filterable()
                .cell(|v, _| match v {
                    Some(Value::Bool(true)) => "Late".to_string(),
                    _ => "On time".to_string(),
                }),
            Column::new("percentage", "Score")
                .sortable()
                .cell(|v, _| match v {
                    Some(Value::Float(p)) => format!("{p:.1}%"),
                    Some(Value::Int(p)) => format!("{p}.0%"),
                    _ => String::new(),
                }),
            Column::new("letterGrade", "Grade").sortable().filterable(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::homework::HomeworkInput;
    use crate::repo::students::StudentInput;

    fn temp_db() -> Connection {
        let dir = std::env::temp_dir().join(format!("schoold-submissions-{}", Uuid::new_v4()));
        crate::db::open_db(&dir).expect("open db")
    }

    fn seed(conn: &Connection) -> (String, String) {
        let student = SqliteStudents::new(conn)
            .create(StudentInput {
                first_name: Some("Lena".into()),
                last_name: Some("Ortiz".into()),
                email: Some("lena@school.edu".into()),
                date_of_birth: Some("2010-10-10".into()),
                gender: Some("FEMALE".into()),
                class_id: Some("8A".into()),
                roll_number: Some("3".into()),
                admission_number: Some("A-803".into()),
                admission_date: Some("2022-06-01".into()),
                ..Default::default()
            })
            .expect("student");
        let homework = SqliteHomework::new(conn)
            .create(HomeworkInput {
                class_id: Some("8A".into()),
                subject_id: Some("history".into()),
                title: Some("Timeline".into()),
                due_date: Some("2099-05-01T12:00:00Z".into()),
                max_marks: Some(20.0),
                ..Default::default()
            })
            .expect("homework");
        (homework.id, student.id)
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).expect("time").with_timezone(&Utc)
    }

    fn hand_in(homework_id: &str, student_id: &str) -> SubmissionInput {
        SubmissionInput {
            homework_id: Some(homework_id.into()),
            student_id: Some(student_id.into()),
            content: Some("my answer".into()),
        }
    }

    #[test]
    fn after_due_date_is_late() {
        let conn = temp_db();
        let (hw, st) = seed(&conn);
        let repo = SqliteSubmissions::new(&conn);

        let on_time = repo.submit_at(hand_in(&hw, &st), at("2099-05-01T11:59:59Z")).expect("submit");
        assert!(!on_time.is_late);
        assert_eq!(on_time.status, HomeworkStatus::Submitted);

        let late = repo.submit_at(hand_in(&hw, &st), at("2099-05-01T12:00:01Z")).expect("resubmit");
        assert!(late.is_late);
        assert_eq!(late.status, HomeworkStatus::LateSubmission);
        assert_eq!(late.id, on_time.id);
    }

    #[test]
    fn grade_bounded_by_max() {
        let conn = temp_db();
        let (hw, st) = seed(&conn);
        let repo = SqliteSubmissions::new(&conn);
        let sub = repo.submit_at(hand_in(&hw, &st), at("2099-04-01T00:00:00Z")).expect("submit");

        let too_high = repo
            .grade(GradeInput {
                homework_submission_id: Some(sub.id.clone()),
                grade: Some(21.0),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(too_high.to_string(), "Grade cannot exceed max grade");

        // max grade defaults to the homework's max marks
        let graded = repo
            .grade(GradeInput {
                homework_submission_id: Some(sub.id.clone()),
                grade: Some(17.0),
                feedback: Some("Good sources".into()),
                ..Default::default()
            })
            .expect("grade");
        assert_eq!(graded.status, HomeworkStatus::Graded);
        assert_eq!(graded.max_grade, Some(20.0));
        assert_eq!(graded.percentage, Some(85.0));
        assert_eq!(graded.letter_grade, Some("A"));

        let again = repo.submit_at(hand_in(&hw, &st), at("2099-04-02T00:00:00Z")).unwrap_err();
        assert_eq!(again.code(), "conflict");

        let graded_list = repo.graded(&SubmissionFilter::default()).expect("graded");
        assert_eq!(graded_list.len(), 1);
    }

    #[test]
    fn unknown_homework_is_not_found() {
        let conn = temp_db();
        let (_, st) = seed(&conn);
        let err = SqliteSubmissions::new(&conn)
            .submit_at(hand_in("missing", &st), Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn record_shows_score_and_letter() {
        let conn = temp_db();
        let (hw, st) = seed(&conn);
        let repo = SqliteSubmissions::new(&conn);
        let sub = repo.submit_at(hand_in(&hw, &st), at("2099-04-01T00:00:00Z")).expect("submit");
        let graded = repo
            .grade(GradeInput {
                homework_submission_id: Some(sub.id),
                grade: Some(9.0),
                max_grade: Some(10.0),
                ..Default::default()
            })
            .expect("grade");
        let rec = graded.to_record();
        let cols = HomeworkSubmission::columns();
        let score = cols.iter().find(|c| c.key == "percentage").expect("score column");
        assert_eq!(score.render(&rec), "90.0%");
        assert_eq!(rec.get("letterGrade"), Some(&Value::Text("A+".into())));
    }
}
