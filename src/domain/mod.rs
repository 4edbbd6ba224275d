pub mod employee;
pub mod employer;
pub mod finance;
pub mod person;
pub mod schedule;
pub mod travel;
