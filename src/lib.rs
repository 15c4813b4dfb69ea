//! Guest, service and appointment records for a small resort, kept in one SQLite file.

pub mod appointments;
pub mod choice;
pub mod config;
pub mod db;
pub mod desk;
pub mod error;
pub mod guests;
pub mod logging;
pub mod parse;
pub mod services;
pub mod shell;

pub use appointments::{AppointmentInput, AppointmentLedger, AppointmentStatus, AppointmentView};
pub use choice::Choice;
pub use config::{DeskConfig, LogConfig};
pub use db::Store;
pub use desk::{Desk, Notice, NoticeLevel, Outcome, TabKind};
pub use error::{AppError, AppResult, DeskError, DeskResult, Entity, ErrorKind};
pub use guests::{Guest, GuestInput, GuestRegistry};
pub use services::{Service, ServiceCatalog, ServiceInput};
