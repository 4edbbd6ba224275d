//! Wire-format mappers. Mapping is pure, preserves input order, and never
//! throws for a well-formed entity. Optional fields serialize as `null`
//! rather than disappearing, so consumers can rely on key presence.

pub mod employee;
pub mod employer;
