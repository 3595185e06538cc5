use super::validate::{date, email, length, optional, required};
use super::{active_label, conflict_on_unique, now_stamp, RepoError, Repository, Result, Tabular};
use crate::table::{Column, Record};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            "OTHER" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Registration form payload. Everything is optional at the wire level so
/// that missing fields surface as validation messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub class_id: Option<String>,
    pub section_id: Option<String>,
    pub roll_number: Option<String>,
    pub admission_number: Option<String>,
    pub admission_date: Option<String>,
    pub parent_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub class_id: String,
    pub section_id: Option<String>,
    pub roll_number: String,
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: Option<String>,
    pub parent_email: Option<String>,
    pub admission_date: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentFilter {
    pub class_id: Option<String>,
    pub section_id: Option<String>,
    pub is_active: Option<bool>,
    /// Matches name, roll number or admission number, ignoring case.
    pub search: Option<String>,
}

struct ValidStudent {
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    date_of_birth: String,
    gender: Gender,
    address: Option<String>,
    class_id: String,
    section_id: Option<String>,
    roll_number: String,
    admission_number: String,
    admission_date: String,
    parent_email: Option<String>,
}

fn validate(input: &StudentInput) -> Result<ValidStudent> {
    let first_name = required(&input.first_name, "firstName", "First name")?;
    length(&first_name, "firstName", "First name", 2, 50)?;
    let last_name = required(&input.last_name, "lastName", "Last name")?;
    length(&last_name, "lastName", "Last name", 2, 50)?;
    let email_addr = required(&input.email, "email", "Email")?;
    email(&email_addr, "email", "Invalid email address")?;
    let dob = required(&input.date_of_birth, "dateOfBirth", "Date of birth")?;
    let dob = date(&dob, "dateOfBirth", "Date of birth")?;
    let gender_raw = required(&input.gender, "gender", "Gender")?;
    let gender = Gender::parse(&gender_raw)
        .ok_or_else(|| RepoError::invalid("gender", "Gender must be MALE, FEMALE or OTHER"))?;
    let class_id = required(&input.class_id, "classId", "Class")?;
    let roll_number = required(&input.roll_number, "rollNumber", "Roll number")?;
    let admission_number = required(&input.admission_number, "admissionNumber", "Admission number")?;
    let admission = required(&input.admission_date, "admissionDate", "Admission date")?;
    let admission = date(&admission, "admissionDate", "Admission date")?;
    let parent_email = optional(&input.parent_email);
    if let Some(pe) = &parent_email {
        email(pe, "parentEmail", "Invalid parent email")?;
    }
    Ok(ValidStudent {
        first_name,
        last_name,
        email: email_addr,
        phone: optional(&input.phone),
        date_of_birth: dob.to_string(),
        gender,
        address: optional(&input.address),
        class_id,
        section_id: optional(&input.section_id),
        roll_number,
        admission_number,
        admission_date: admission.to_string(),
        parent_email,
    })
}

const SELECT_COLUMNS: &str = "id, class_id, section_id, roll_number, admission_number,
    first_name, last_name, email, phone, date_of_birth, gender, address,
    parent_email, admission_date, is_active, created_at, updated_at";

fn row_to_student(r: &Row<'_>) -> rusqlite::Result<Student> {
    let gender: String = r.get(10)?;
    Ok(Student {
        id: r.get(0)?,
        class_id: r.get(1)?,
        section_id: r.get(2)?,
        roll_number: r.get(3)?,
        admission_number: r.get(4)?,
        first_name: r.get(5)?,
        last_name: r.get(6)?,
        email: r.get(7)?,
        phone: r.get(8)?,
        date_of_birth: r.get(9)?,
        gender: Gender::parse(&gender).unwrap_or(Gender::Other),
        address: r.get(11)?,
        parent_email: r.get(12)?,
        admission_date: r.get(13)?,
        is_active: r.get::<_, i64>(14)? != 0,
        created_at: r.get(15)?,
        updated_at: r.get(16)?,
    })
}

pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub struct SqliteStudents<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStudents<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<Student>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM students WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], row_to_student)
            .optional()?)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM students WHERE id = ?", [id], |r| {
                r.get::<_, i64>(0)
            })
            .optional()?
            .is_some())
    }
}

impl Repository for SqliteStudents<'_> {
    type Item = Student;
    type Criteria = StudentFilter;
    type Input = StudentInput;

    fn list(&self, criteria: &StudentFilter) -> Result<Vec<Student>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<SqlValue> = Vec::new();
        if let Some(v) = optional(&criteria.class_id) {
            clauses.push("class_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(v) = optional(&criteria.section_id) {
            clauses.push("section_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(active) = criteria.is_active {
            clauses.push("is_active = ?");
            binds.push(SqlValue::Integer(active as i64));
        }
        if let Some(term) = optional(&criteria.search) {
            clauses.push(
                "((first_name || ' ' || last_name) LIKE ? ESCAPE '\\'
                  OR roll_number LIKE ? ESCAPE '\\'
                  OR admission_number LIKE ? ESCAPE '\\')",
            );
            let pat = like_pattern(&term);
            for _ in 0..3 {
                binds.push(SqlValue::Text(pat.clone()));
            }
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM students {where_sql} ORDER BY roll_number, last_name, first_name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_student)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: StudentInput) -> Result<Student> {
        let v = validate(&input)?;
        let id = Uuid::new_v4().to_string();
        let now = now_stamp();
        self.conn
            .execute(
                "INSERT INTO students(
                   id, class_id, section_id, roll_number, admission_number,
                   first_name, last_name, email, phone, date_of_birth, gender,
                   address, parent_email, admission_date, is_active, created_at, updated_at
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
                rusqlite::params![
                    id,
                    v.class_id,
                    v.section_id,
                    v.roll_number,
                    v.admission_number,
                    v.first_name,
                    v.last_name,
                    v.email,
                    v.phone,
                    v.date_of_birth,
                    v.gender.as_str(),
                    v.address,
                    v.parent_email,
                    v.admission_date,
                    now,
                    now,
                ],
            )
            .map_err(|e| conflict_on_unique(e, "Admission number already exists"))?;
        tracing::info!(student_id = %id, class_id = %v.class_id, "student registered");
        self.get(&id)?.ok_or(RepoError::NotFound("student"))
    }
}

impl Tabular for Student {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("name", self.full_name())
            .with("rollNumber", self.roll_number.as_str())
            .with("admissionNumber", self.admission_number.as_str())
            .with("classId", self.class_id.as_str())
            .with("sectionId", self.section_id.clone())
            .with("gender", self.gender.as_str())
            .with("email", self.email.as_str())
            .with("dateOfBirth", self.date_of_birth.as_str())
            .with("isActive", self.is_active)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").sortable(),
            Column::new("rollNumber", "Roll No").sortable(),
            Column::new("admissionNumber", "Admission No").sortable(),
            Column::new("classId", "Class").sortable().filterable(),
            Column::new("sectionId", "Section").filterable(),
            Column::new("gender", "Gender").filterable(),
            Column::new("isActive", "Status")
                .filterable()
                .cell(|v, _| active_label(v)),
        ]
    }
}
