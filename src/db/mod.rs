pub mod fallback;
pub mod manager;
pub mod unit_of_work;

pub use manager::{Database, DbError};
