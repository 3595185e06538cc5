pub mod attendance;
pub mod core;
pub mod grades;
pub mod homework;
pub mod registry;
pub mod students;
pub mod table;
pub mod timetable;
pub mod transport;
