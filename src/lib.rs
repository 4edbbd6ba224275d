pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod validate;
