//! Client-side data grid: search, column filters, sort and pagination over
//! an in-memory record set.

mod engine;
pub mod paginate;
pub mod predicate;
mod query;
pub mod sort;
mod value;

pub use engine::{TableEngine, TableOptions};
pub use query::{TablePage, TableQuery};
pub use value::{Column, Record, Value};
