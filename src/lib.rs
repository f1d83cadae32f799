//! Agenda and financial report core of the HealthMoney dashboard.
//!
//! Pages own what the user sees and where they get sent; services talk to the
//! dashboard backend; models carry the data between them.

pub mod config;
pub mod models;
pub mod pages;
pub mod services;
pub mod tracing;
pub mod utils;
