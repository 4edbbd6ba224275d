//! One handler function per verb+path. Every handler follows the same shape:
//! parse input, validate, call the store, map the response; failures funnel
//! through `ApiError` via `?`.
//!
//! Envelope conventions are intentionally split and preserved for existing
//! consumers: V1 resources return bare entities/arrays, V2 and finance
//! resources return `{ success, data, count?, summary? }`.

pub mod auth;
pub mod employees;
pub mod employees_v2;
pub mod employers;
pub mod finance;
pub mod meetings;
pub mod properties;
pub mod reference;
pub mod tasks;
pub mod travel;
