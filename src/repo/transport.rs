use super::students::SqliteStudents;
use super::validate::{clock_time, date, lenient_f64, lenient_i64, optional, required};
use super::{conflict_on_unique, now_stamp, RepoError, Repository, Result, Tabular};
use crate::table::{Column, Record, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn school_required(school_id: &Option<String>) -> Result<String> {
    required(school_id, "schoolId", "School ID")
}

// ---------- buses ----------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusInput {
    pub school_id: Option<String>,
    pub number: Option<String>,
    pub registration_number: Option<String>,
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub capacity: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub manufacturing_year: Option<i64>,
    pub fuel_type: Option<String>,
    pub insurance_expiry: Option<String>,
    pub fitness_expiry: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: String,
    pub school_id: String,
    pub number: String,
    pub registration_number: String,
    pub model: Option<String>,
    pub capacity: i64,
    pub manufacturing_year: Option<i64>,
    pub fuel_type: Option<String>,
    pub insurance_expiry: Option<String>,
    pub fitness_expiry: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolFilter {
    pub school_id: Option<String>,
}

const BUS_COLUMNS: &str = "id, school_id, number, registration_number, model, capacity,
    manufacturing_year, fuel_type, insurance_expiry, fitness_expiry, is_active";

fn row_to_bus(r: &Row<'_>) -> rusqlite::Result<Bus> {
    Ok(Bus {
        id: r.get(0)?,
        school_id: r.get(1)?,
        number: r.get(2)?,
        registration_number: r.get(3)?,
        model: r.get(4)?,
        capacity: r.get(5)?,
        manufacturing_year: r.get(6)?,
        fuel_type: r.get(7)?,
        insurance_expiry: r.get(8)?,
        fitness_expiry: r.get(9)?,
        is_active: r.get::<_, i64>(10)? != 0,
    })
}

fn optional_date(value: &Option<String>, field: &str, label: &str) -> Result<Option<String>> {
    optional(value)
        .map(|s| date(&s, field, label).map(|d| d.to_string()))
        .transpose()
}

pub struct SqliteBuses<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBuses<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<Bus>> {
        let sql = format!("SELECT {BUS_COLUMNS} FROM buses WHERE id = ?");
        Ok(self.conn.query_row(&sql, [id], row_to_bus).optional()?)
    }
}

impl Repository for SqliteBuses<'_> {
    type Item = Bus;
    type Criteria = SchoolFilter;
    type Input = BusInput;

    fn list(&self, criteria: &SchoolFilter) -> Result<Vec<Bus>> {
        let school_id = school_required(&criteria.school_id)?;
        let sql = format!(
            "SELECT {BUS_COLUMNS} FROM buses
             WHERE school_id = ? AND is_active = 1
             ORDER BY number"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([&school_id], row_to_bus)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: BusInput) -> Result<Bus> {
        let missing = || {
            RepoError::invalid(
                "bus",
                "School ID, bus number, registration number, and capacity are required",
            )
        };
        let school_id = optional(&input.school_id).ok_or_else(missing)?;
        let number = optional(&input.number).ok_or_else(missing)?;
        let registration = optional(&input.registration_number).ok_or_else(missing)?;
        let capacity = input.capacity.ok_or_else(missing)?;
        if capacity <= 0 {
            return Err(RepoError::invalid("capacity", "Capacity must be positive"));
        }
        let insurance = optional_date(&input.insurance_expiry, "insuranceExpiry", "Insurance expiry")?;
        let fitness = optional_date(&input.fitness_expiry, "fitnessExpiry", "Fitness expiry")?;

        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO buses(
                   id, school_id, number, registration_number, model, capacity,
                   manufacturing_year, fuel_type, insurance_expiry, fitness_expiry,
                   is_active, created_at
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
                rusqlite::params![
                    id,
                    school_id,
                    number,
                    registration,
                    optional(&input.model),
                    capacity,
                    input.manufacturing_year,
                    optional(&input.fuel_type),
                    insurance,
                    fitness,
                    now_stamp(),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "Bus number or registration number already exists"))?;
        tracing::info!(bus_id = %id, school_id = %school_id, "bus created");
        self.get(&id)?.ok_or(RepoError::NotFound("bus"))
    }
}

impl Tabular for Bus {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("number", self.number.as_str())
            .with("registrationNumber", self.registration_number.as_str())
            .with("model", self.model.clone())
            .with("capacity", self.capacity)
            .with("fuelType", self.fuel_type.clone())
            .with("insuranceExpiry", self.insurance_expiry.clone())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("number", "Bus No").sortable(),
            Column::new("registrationNumber", "Registration").sortable(),
            Column::new("model", "Model").sortable().filterable(),
            Column::new("capacity", "Capacity")
                .sortable()
                .cell(|v, _| match v {
                    Some(Value::Int(n)) => format!("{n} seats"),
                    _ => String::new(),
                }),
            Column::new("fuelType", "Fuel").filterable(),
            Column::new("insuranceExpiry", "Insurance Expiry").sortable(),
        ]
    }
}

// ---------- drivers ----------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverInput {
    pub school_id: Option<String>,
    pub employee_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<String>,
    pub date_of_joining: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub school_id: String,
    pub employee_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub license_number: String,
    pub license_expiry: String,
    pub date_of_joining: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub salary: Option<f64>,
    pub is_active: bool,
}

const DRIVER_COLUMNS: &str = "id, school_id, employee_id, name, phone, email, license_number,
    license_expiry, date_of_joining, address, emergency_contact, salary, is_active";

fn row_to_driver(r: &Row<'_>) -> rusqlite::Result<Driver> {
    Ok(Driver {
        id: r.get(0)?,
        school_id: r.get(1)?,
        employee_id: r.get(2)?,
        name: r.get(3)?,
        phone: r.get(4)?,
        email: r.get(5)?,
        license_number: r.get(6)?,
        license_expiry: r.get(7)?,
        date_of_joining: r.get(8)?,
        address: r.get(9)?,
        emergency_contact: r.get(10)?,
        salary: r.get(11)?,
        is_active: r.get::<_, i64>(12)? != 0,
    })
}

pub struct SqliteDrivers<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteDrivers<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<Driver>> {
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = ?");
        Ok(self.conn.query_row(&sql, [id], row_to_driver).optional()?)
    }
}

impl Repository for SqliteDrivers<'_> {
    type Item = Driver;
    type Criteria = SchoolFilter;
    type Input = DriverInput;

    fn list(&self, criteria: &SchoolFilter) -> Result<Vec<Driver>> {
        let school_id = school_required(&criteria.school_id)?;
        let sql = format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers
             WHERE school_id = ? AND is_active = 1
             ORDER BY name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([&school_id], row_to_driver)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: DriverInput) -> Result<Driver> {
        let missing = || {
            RepoError::invalid(
                "driver",
                "School ID, employee ID, name, phone, license number, license expiry, and joining date are required",
            )
        };
        let school_id = optional(&input.school_id).ok_or_else(missing)?;
        let employee_id = optional(&input.employee_id).ok_or_else(missing)?;
        let name = optional(&input.name).ok_or_else(missing)?;
        let phone = optional(&input.phone).ok_or_else(missing)?;
        let license_number = optional(&input.license_number).ok_or_else(missing)?;
        let license_expiry = optional(&input.license_expiry).ok_or_else(missing)?;
        let joined = optional(&input.date_of_joining).ok_or_else(missing)?;
        let license_expiry = date(&license_expiry, "licenseExpiry", "License expiry")?;
        let joined = date(&joined, "dateOfJoining", "Date of joining")?;

        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO drivers(
                   id, school_id, employee_id, name, phone, email, license_number,
                   license_expiry, date_of_joining, address, emergency_contact, salary,
                   is_active, created_at
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
                rusqlite::params![
                    id,
                    school_id,
                    employee_id,
                    name,
                    phone,
                    optional(&input.email),
                    license_number,
                    license_expiry.to_string(),
                    joined.to_string(),
                    optional(&input.address),
                    optional(&input.emergency_contact),
                    input.salary,
                    now_stamp(),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "Employee ID or license number already exists"))?;
        tracing::info!(driver_id = %id, school_id = %school_id, "driver created");
        self.get(&id)?.ok_or(RepoError::NotFound("driver"))
    }
}

impl Tabular for Driver {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("employeeId", self.employee_id.as_str())
            .with("name", self.name.as_str())
            .with("phone", self.phone.as_str())
            .with("licenseNumber", self.license_number.as_str())
            .with("licenseExpiry", self.license_expiry.as_str())
            .with("dateOfJoining", self.date_of_joining.as_str())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").sortable(),
            Column::new("employeeId", "Employee ID").sortable(),
            Column::new("phone", "Phone"),
            Column::new("licenseNumber", "License"),
            Column::new("licenseExpiry", "License Expiry").sortable(),
        ]
    }
}

// ---------- routes ----------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopInput {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    pub arrival_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteInput {
    pub bus_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub estimated_duration: Option<i64>,
    pub stops: Vec<StopInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub arrival_time: String,
    pub sequence: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub bus_id: String,
    pub bus_number: String,
    pub name: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub distance: Option<f64>,
    pub estimated_duration: Option<i64>,
    pub stops: Vec<Stop>,
}

const ROUTE_SELECT: &str = "SELECT r.id, r.bus_id, b.number, r.name, r.description,
    r.start_time, r.end_time, r.distance, r.estimated_duration
    FROM routes r JOIN buses b ON b.id = r.bus_id";

fn row_to_route(r: &Row<'_>) -> rusqlite::Result<Route> {
    Ok(Route {
        id: r.get(0)?,
        bus_id: r.get(1)?,
        bus_number: r.get(2)?,
        name: r.get(3)?,
        description: r.get(4)?,
        start_time: r.get(5)?,
        end_time: r.get(6)?,
        distance: r.get(7)?,
        estimated_duration: r.get(8)?,
        stops: Vec::new(),
    })
}

pub struct SqliteRoutes<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRoutes<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn load_stops(&self, route_id: &str) -> Result<Vec<Stop>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, address, latitude, longitude, arrival_time, sequence
             FROM stops WHERE route_id = ? ORDER BY sequence",
        )?;
        let stops = stmt
            .query_map([route_id], |r| {
                Ok(Stop {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    address: r.get(2)?,
                    latitude: r.get(3)?,
                    longitude: r.get(4)?,
                    arrival_time: r.get(5)?,
                    sequence: r.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stops)
    }

    pub fn get(&self, id: &str) -> Result<Option<Route>> {
        let sql = format!("{ROUTE_SELECT} WHERE r.id = ?");
        let route = self.conn.query_row(&sql, [id], row_to_route).optional()?;
        match route {
            Some(mut route) => {
                route.stops = self.load_stops(&route.id)?;
                Ok(Some(route))
            }
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM routes WHERE id = ?", [id], |r| {
                r.get::<_, i64>(0)
            })
            .optional()?
            .is_some())
    }
}

impl Repository for SqliteRoutes<'_> {
    type Item = Route;
    type Criteria = SchoolFilter;
    type Input = RouteInput;

    fn list(&self, criteria: &SchoolFilter) -> Result<Vec<Route>> {
        let school_id = school_required(&criteria.school_id)?;
        let sql = format!("{ROUTE_SELECT} WHERE b.school_id = ? AND r.is_active = 1 ORDER BY r.name");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut routes = stmt
            .query_map([&school_id], row_to_route)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for route in &mut routes {
            route.stops = self.load_stops(&route.id)?;
        }
        Ok(routes)
    }

    fn create(&self, input: RouteInput) -> Result<Route> {
        let missing = || {
            RepoError::invalid(
                "route",
                "Bus ID, route name, start time, and end time are required",
            )
        };
        let bus_id = optional(&input.bus_id).ok_or_else(missing)?;
        let name = optional(&input.name).ok_or_else(missing)?;
        let start_time = optional(&input.start_time).ok_or_else(missing)?;
        let end_time = optional(&input.end_time).ok_or_else(missing)?;
        clock_time(&start_time, "startTime")?;
        clock_time(&end_time, "endTime")?;
        if SqliteBuses::new(self.conn).get(&bus_id)?.is_none() {
            return Err(RepoError::NotFound("bus"));
        }
        for (i, stop) in input.stops.iter().enumerate() {
            let field = format!("stops[{i}]");
            if optional(&stop.name).is_none()
                || optional(&stop.address).is_none()
                || optional(&stop.arrival_time).is_none()
            {
                return Err(RepoError::invalid(
                    &field,
                    "Stop name, address, and arrival time are required",
                ));
            }
        }

        let id = Uuid::new_v4().to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO routes(
               id, bus_id, name, description, start_time, end_time, distance,
               estimated_duration, is_active, created_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
            rusqlite::params![
                id,
                bus_id,
                name,
                optional(&input.description),
                start_time,
                end_time,
                input.distance,
                input.estimated_duration,
                now_stamp(),
            ],
        )?;
        for (i, stop) in input.stops.iter().enumerate() {
            tx.execute(
                "INSERT INTO stops(
                   id, route_id, name, address, latitude, longitude, arrival_time, sequence
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    id,
                    optional(&stop.name),
                    optional(&stop.address),
                    stop.latitude,
                    stop.longitude,
                    optional(&stop.arrival_time),
                    (i + 1) as i64,
                ],
            )?;
        }
        tx.commit()?;
        tracing::info!(route_id = %id, stops = input.stops.len(), "route created");
        self.get(&id)?.ok_or(RepoError::NotFound("route"))
    }
}

impl Tabular for Route {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("busNumber", self.bus_number.as_str())
            .with("startTime", self.start_time.as_str())
            .with("endTime", self.end_time.as_str())
            .with("distance", self.distance)
            .with("stopCount", self.stops.len() as i64)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Route").sortable(),
            Column::new("busNumber", "Bus").sortable().filterable(),
            Column::new("startTime", "Start").sortable(),
            Column::new("endTime", "End").sortable(),
            Column::new("distance", "Distance (km)").sortable(),
            Column::new("stopCount", "Stops").sortable(),
        ]
    }
}

// ---------- assignments ----------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentInput {
    pub student_id: Option<String>,
    pub route_id: Option<String>,
    pub stop_id: Option<String>,
    pub boarding_point: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub fee_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentFilter {
    pub school_id: Option<String>,
    pub route_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub route_id: String,
    pub route_name: String,
    pub bus_number: String,
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
    pub boarding_point: Option<String>,
    pub fee_amount: Option<f64>,
    pub created_at: String,
}

const ASSIGNMENT_SELECT: &str = "SELECT a.id, a.student_id,
    s.first_name || ' ' || s.last_name, a.route_id, r.name, b.number,
    a.stop_id, st.name, a.boarding_point, a.fee_amount, a.created_at
    FROM transport_assignments a
    JOIN students s ON s.id = a.student_id
    JOIN routes r ON r.id = a.route_id
    JOIN buses b ON b.id = r.bus_id
    LEFT JOIN stops st ON st.id = a.stop_id";

fn row_to_assignment(r: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: r.get(0)?,
        student_id: r.get(1)?,
        student_name: r.get(2)?,
        route_id: r.get(3)?,
        route_name: r.get(4)?,
        bus_number: r.get(5)?,
        stop_id: r.get(6)?,
        stop_name: r.get(7)?,
        boarding_point: r.get(8)?,
        fee_amount: r.get(9)?,
        created_at: r.get(10)?,
    })
}

pub struct SqliteAssignments<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAssignments<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: &str) -> Result<Option<Assignment>> {
        let sql = format!("{ASSIGNMENT_SELECT} WHERE a.id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], row_to_assignment)
            .optional()?)
    }
}

impl Repository for SqliteAssignments<'_> {
    type Item = Assignment;
    type Criteria = AssignmentFilter;
    type Input = AssignmentInput;

    fn list(&self, criteria: &AssignmentFilter) -> Result<Vec<Assignment>> {
        let school_id = school_required(&criteria.school_id)?;
        let mut clauses = vec!["b.school_id = ?", "a.is_active = 1"];
        let mut binds = vec![SqlValue::Text(school_id)];
        if let Some(v) = optional(&criteria.route_id) {
            clauses.push("a.route_id = ?");
            binds.push(SqlValue::Text(v));
        }
        if let Some(v) = optional(&criteria.student_id) {
            clauses.push("a.student_id = ?");
            binds.push(SqlValue::Text(v));
        }
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE {} ORDER BY a.created_at DESC, a.rowid DESC",
            clauses.join(" AND ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), row_to_assignment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn create(&self, input: AssignmentInput) -> Result<Assignment> {
        let missing = || RepoError::invalid("assignment", "Student ID and route ID are required");
        let student_id = optional(&input.student_id).ok_or_else(missing)?;
        let route_id = optional(&input.route_id).ok_or_else(missing)?;
        if !SqliteStudents::new(self.conn).exists(&student_id)? {
            return Err(RepoError::NotFound("student"));
        }
        let routes = SqliteRoutes::new(self.conn);
        if !routes.exists(&route_id)? {
            return Err(RepoError::NotFound("route"));
        }
        let stop_id = optional(&input.stop_id);
        if let Some(stop) = &stop_id {
            let on_route = self
                .conn
                .query_row(
                    "SELECT 1 FROM stops WHERE id = ? AND route_id = ?",
                    (stop, &route_id),
                    |r| r.get::<_, i64>(0),
                )
                .optional()?
                .is_some();
            if !on_route {
                return Err(RepoError::NotFound("stop"));
            }
        }

        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO transport_assignments(
                   id, student_id, route_id, stop_id, boarding_point, fee_amount,
                   is_active, created_at
                 ) VALUES(?, ?, ?, ?, ?, ?, 1, ?)",
                rusqlite::params![
                    id,
                    student_id,
                    route_id,
                    stop_id,
                    optional(&input.boarding_point),
                    input.fee_amount,
                    now_stamp(),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "Student is already assigned to this route"))?;
        tracing::info!(assignment_id = %id, route_id = %route_id, "transport assignment created");
        self.get(&id)?.ok_or(RepoError::NotFound("assignment"))
    }
}

impl Tabular for Assignment {
    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("studentName", self.student_name.as_str())
            .with("routeName", self.route_name.as_str())
            .with("busNumber", self.bus_number.as_str())
            .with("stopName", self.stop_name.clone())
            .with("boardingPoint", self.boarding_point.clone())
            .with("feeAmount", self.fee_amount)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("studentName", "Student").sortable(),
            Column::new("routeName", "Route").sortable().filterable(),
            Column::new("busNumber", "Bus").filterable(),
            Column::new("stopName", "Stop").filterable(),
            Column::new("feeAmount", "Fee").sortable().cell(|v, _| match v {
                Some(Value::Float(f)) => format!("{f:.2}"),
                Some(Value::Int(i)) => format!("{i}.00"),
                _ => "-".to_string(),
            }),
        ]
    }
}
