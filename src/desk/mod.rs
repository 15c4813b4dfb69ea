//! Presentation model: three tab contexts, each binding a form to list selection and the
//! Add / Update / Delete / Clear actions.
//!
//! Nothing here knows about terminals or widgets. Actions return [`Outcome`]s or
//! [`AppError`]s and the front end decides how to show them (see [`notice`]).

use std::fmt;

use crate::db::Store;
use crate::error::{AppError, AppResult, Entity};

pub mod appointments_tab;
pub mod guests_tab;
pub mod notice;
pub mod services_tab;

pub use appointments_tab::{AppointmentForm, AppointmentTab};
pub use guests_tab::GuestTab;
pub use notice::{Notice, NoticeLevel};
pub use services_tab::ServiceTab;

/// Code for a `set` on a field the form does not have.
pub const FORM_UNKNOWN_FIELD: &str = "VALIDATION/UNKNOWN_FIELD";

/// Asks the user before a destructive action runs.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// What a successful action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Added { entity: Entity, id: i64 },
    Updated { entity: Entity, id: i64 },
    Deleted { entity: Entity, id: i64 },
    /// The user declined the confirmation; nothing was written.
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { entity, id } => write!(f, "{} #{id} added", capitalized(*entity)),
            Outcome::Updated { entity, id } => {
                write!(f, "{} #{id} updated", capitalized(*entity))
            }
            Outcome::Deleted { entity, id } => {
                write!(f, "{} #{id} deleted", capitalized(*entity))
            }
            Outcome::Cancelled => f.write_str("Cancelled"),
        }
    }
}

fn capitalized(entity: Entity) -> &'static str {
    match entity {
        Entity::Guest => "Guest",
        Entity::Service => "Service",
        Entity::Appointment => "Appointment",
    }
}

pub(crate) fn unknown_field(entity: Entity, field: &str) -> AppError {
    AppError::new(FORM_UNKNOWN_FIELD, format!("{entity} form has no field {field:?}"))
        .with_context("entity", entity.as_str())
        .with_context("field", field.to_string())
}

/// Which tab a command is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Guests,
    Services,
    Appointments,
}

impl TabKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "g" | "guest" | "guests" => Some(TabKind::Guests),
            "s" | "service" | "services" => Some(TabKind::Services),
            "a" | "appointment" | "appointments" => Some(TabKind::Appointments),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabKind::Guests => "guests",
            TabKind::Services => "services",
            TabKind::Appointments => "appointments",
        }
    }
}

/// The three tabs over one store.
///
/// Every committed write reloads the tab it touched. Guest and service writes also
/// reload the appointment tab so its selectors and joined rows stay in step with storage.
pub struct Desk {
    pub guests: GuestTab,
    pub services: ServiceTab,
    pub appointments: AppointmentTab,
    reload_error: Option<AppError>,
}

impl Desk {
    pub async fn open(store: &Store) -> AppResult<Self> {
        let pool = store.pool().clone();
        let mut desk = Self {
            guests: GuestTab::new(pool.clone()),
            services: ServiceTab::new(pool.clone()),
            appointments: AppointmentTab::new(pool),
            reload_error: None,
        };
        desk.refresh().await?;
        Ok(desk)
    }

    pub async fn refresh(&mut self) -> AppResult<()> {
        self.guests.refresh().await?;
        self.services.refresh().await?;
        self.appointments.refresh().await
    }

    /// The reload failure left behind by the last committed write, if any.
    ///
    /// The write itself succeeded; only the cached rows may be out of date.
    pub fn take_reload_error(&mut self) -> Option<AppError> {
        self.reload_error.take()
    }

    async fn reload_after(&mut self, tab: TabKind, outcome: Outcome) -> Outcome {
        if outcome == Outcome::Cancelled {
            return outcome;
        }
        let reloaded = match tab {
            TabKind::Guests => match self.guests.refresh().await {
                Ok(()) => self.appointments.refresh().await,
                Err(err) => Err(err),
            },
            TabKind::Services => match self.services.refresh().await {
                Ok(()) => self.appointments.refresh().await,
                Err(err) => Err(err),
            },
            TabKind::Appointments => self.appointments.refresh().await,
        };
        if let Err(err) = reloaded {
            tracing::warn!(
                target: "resortdesk",
                event = "reload_failed",
                tab = tab.as_str(),
                code = err.code(),
                message = err.message()
            );
            self.reload_error = Some(err);
        }
        outcome
    }

    pub async fn add_guest(&mut self) -> AppResult<Outcome> {
        let outcome = self.guests.add().await?;
        Ok(self.reload_after(TabKind::Guests, outcome).await)
    }

    pub async fn update_guest(&mut self) -> AppResult<Outcome> {
        let outcome = self.guests.update().await?;
        Ok(self.reload_after(TabKind::Guests, outcome).await)
    }

    pub async fn delete_guest(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let outcome = self.guests.delete(confirm).await?;
        Ok(self.reload_after(TabKind::Guests, outcome).await)
    }

    pub async fn add_service(&mut self) -> AppResult<Outcome> {
        let outcome = self.services.add().await?;
        Ok(self.reload_after(TabKind::Services, outcome).await)
    }

    pub async fn update_service(&mut self) -> AppResult<Outcome> {
        let outcome = self.services.update().await?;
        Ok(self.reload_after(TabKind::Services, outcome).await)
    }

    pub async fn delete_service(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let outcome = self.services.delete(confirm).await?;
        Ok(self.reload_after(TabKind::Services, outcome).await)
    }

    pub async fn add_appointment(&mut self) -> AppResult<Outcome> {
        let outcome = self.appointments.add().await?;
        Ok(self.reload_after(TabKind::Appointments, outcome).await)
    }

    pub async fn update_appointment(&mut self) -> AppResult<Outcome> {
        let outcome = self.appointments.update().await?;
        Ok(self.reload_after(TabKind::Appointments, outcome).await)
    }

    pub async fn delete_appointment(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let outcome = self.appointments.delete(confirm).await?;
        Ok(self.reload_after(TabKind::Appointments, outcome).await)
    }

    /// Routes the generic tab actions by kind.
    pub async fn add(&mut self, tab: TabKind) -> AppResult<Outcome> {
        match tab {
            TabKind::Guests => self.add_guest().await,
            TabKind::Services => self.add_service().await,
            TabKind::Appointments => self.add_appointment().await,
        }
    }

    pub async fn update(&mut self, tab: TabKind) -> AppResult<Outcome> {
        match tab {
            TabKind::Guests => self.update_guest().await,
            TabKind::Services => self.update_service().await,
            TabKind::Appointments => self.update_appointment().await,
        }
    }

    pub async fn delete(&mut self, tab: TabKind, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        match tab {
            TabKind::Guests => self.delete_guest(confirm).await,
            TabKind::Services => self.delete_service(confirm).await,
            TabKind::Appointments => self.delete_appointment(confirm).await,
        }
    }

    pub fn select(&mut self, tab: TabKind, id: i64) -> AppResult<()> {
        match tab {
            TabKind::Guests => self.guests.select(id),
            TabKind::Services => self.services.select(id),
            TabKind::Appointments => self.appointments.select(id),
        }
    }

    pub fn clear(&mut self, tab: TabKind) {
        match tab {
            TabKind::Guests => self.guests.clear(),
            TabKind::Services => self.services.clear(),
            TabKind::Appointments => self.appointments.clear(),
        }
    }

    pub fn set_field(&mut self, tab: TabKind, field: &str, value: &str) -> AppResult<()> {
        match tab {
            TabKind::Guests => self.guests.set_field(field, value),
            TabKind::Services => self.services.set_field(field, value),
            TabKind::Appointments => self.appointments.set_field(field, value),
        }
    }
}
