//! Power plant performance dashboard.
//!
//! [`data`] turns the raw station table into an immutable
//! [`data::PlantTable`] and answers the three chart queries; the remaining
//! modules are the egui front end.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
