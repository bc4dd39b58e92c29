#![warn(clippy::all, missing_docs)]

//! Core domain logic for EventDesk.
//!
//! This crate hosts the event and customer models, the flat-file
//! persistence layer, the booking engine and configuration handling
//! used by the terminal front end.

pub mod booking;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod query;
pub mod store;

pub use booking::{BookingDesk, BookingReceipt, DataPaths, MAX_TICKETS_PER_BOOKING};
pub use config::AppConfig;
pub use error::{BookingError, BookingResult};
pub use models::{Customer, Event, EventDraft};
pub use query::{list_customers, list_events};
