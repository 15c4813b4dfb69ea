use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{unknown_field, Confirm, Outcome};
use crate::appointments::{AppointmentInput, AppointmentLedger, AppointmentStatus, AppointmentView};
use crate::choice::Choice;
use crate::error::{AppError, AppResult, DeskError, Entity};
use crate::guests::GuestRegistry;
use crate::services::ServiceCatalog;

pub const APPOINTMENT_FIELDS: &[&str] = &["guest", "service", "date", "time", "status"];

/// The appointment form: two selector picks plus free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentForm {
    pub guest: Option<Choice>,
    pub service: Option<Choice>,
    pub date: String,
    pub time: String,
    pub status: String,
}

impl AppointmentForm {
    pub fn to_input(&self) -> AppointmentInput {
        AppointmentInput {
            guest: self.guest.as_ref().map(|choice| choice.id),
            service: self.service.as_ref().map(|choice| choice.id),
            date: self.date.clone(),
            time: self.time.clone(),
            status: self.status.clone(),
        }
    }
}

impl From<&AppointmentView> for AppointmentForm {
    fn from(view: &AppointmentView) -> Self {
        Self {
            guest: Some(view.guest.clone()),
            service: Some(view.service.clone()),
            date: view.date.clone(),
            time: view.time.clone(),
            status: view.status.to_string(),
        }
    }
}

fn op_error(err: DeskError, operation: &'static str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", "appointments")
}

/// Picks the option whose id matches `value`, given either a bare id or an `"id: label"` entry.
fn pick(options: &[Choice], entity: Entity, value: &str) -> AppResult<Option<Choice>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    let id = Choice::id_from_label(value).ok_or_else(|| {
        op_error(
            DeskError::format(
                match entity {
                    Entity::Guest => "guest",
                    _ => "service",
                },
                value,
                "selector entry",
            ),
            "choose",
        )
    })?;
    options
        .iter()
        .find(|choice| choice.id == id)
        .cloned()
        .map(Some)
        .ok_or_else(|| op_error(DeskError::UnknownReference { entity, id }, "choose"))
}

pub struct AppointmentTab {
    ledger: AppointmentLedger,
    guests: GuestRegistry,
    services: ServiceCatalog,
    pub form: AppointmentForm,
    selected: Option<i64>,
    rows: Vec<AppointmentView>,
    guest_options: Vec<Choice>,
    service_options: Vec<Choice>,
}

impl AppointmentTab {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            ledger: AppointmentLedger::new(pool.clone()),
            guests: GuestRegistry::new(pool.clone()),
            services: ServiceCatalog::new(pool),
            form: AppointmentForm::default(),
            selected: None,
            rows: Vec::new(),
            guest_options: Vec::new(),
            service_options: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &AppointmentLedger {
        &self.ledger
    }

    pub fn rows(&self) -> &[AppointmentView] {
        &self.rows
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn guest_options(&self) -> &[Choice] {
        &self.guest_options
    }

    pub fn service_options(&self) -> &[Choice] {
        &self.service_options
    }

    /// Reloads the joined rows and both selectors.
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.rows = self
            .ledger
            .list()
            .await
            .map_err(|err| op_error(err, "list"))?;
        if let Some(id) = self.selected {
            if !self.rows.iter().any(|row| row.id == id) {
                self.selected = None;
            }
        }
        self.refresh_selectors().await
    }

    pub async fn refresh_selectors(&mut self) -> AppResult<()> {
        self.guest_options = self
            .guests
            .choices()
            .await
            .map_err(|err| op_error(err, "list"))?;
        self.service_options = self
            .services
            .choices()
            .await
            .map_err(|err| op_error(err, "list"))?;
        // A pick whose row is gone must not survive into the next write.
        if let Some(choice) = &self.form.guest {
            if !self.guest_options.iter().any(|option| option.id == choice.id) {
                self.form.guest = None;
            }
        }
        if let Some(choice) = &self.form.service {
            if !self.service_options.iter().any(|option| option.id == choice.id) {
                self.form.service = None;
            }
        }
        Ok(())
    }

    /// Sets the guest selector; blank clears it.
    pub fn choose_guest(&mut self, value: &str) -> AppResult<()> {
        self.form.guest = pick(&self.guest_options, Entity::Guest, value)?;
        Ok(())
    }

    /// Sets the service selector; blank clears it.
    pub fn choose_service(&mut self, value: &str) -> AppResult<()> {
        self.form.service = pick(&self.service_options, Entity::Service, value)?;
        Ok(())
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "guest" => self.choose_guest(value),
            "service" => self.choose_service(value),
            "date" => {
                self.form.date = value.to_string();
                Ok(())
            }
            "time" => {
                self.form.time = value.to_string();
                Ok(())
            }
            "status" => {
                self.form.status = value.to_string();
                Ok(())
            }
            _ => Err(unknown_field(Entity::Appointment, field)),
        }
    }

    pub fn select(&mut self, id: i64) -> AppResult<()> {
        let row = self
            .rows
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| {
                op_error(
                    DeskError::NotFound {
                        entity: Entity::Appointment,
                        id,
                    },
                    "select",
                )
            })?;
        self.form = AppointmentForm::from(row);
        self.selected = Some(id);
        Ok(())
    }

    /// Empties the form, status included, and drops the selection.
    pub fn clear(&mut self) {
        self.form = AppointmentForm::default();
        self.selected = None;
    }

    fn require_selection(&self, operation: &'static str) -> AppResult<i64> {
        self.selected.ok_or_else(|| {
            op_error(DeskError::NothingSelected(Entity::Appointment), operation)
        })
    }

    pub async fn add(&mut self) -> AppResult<Outcome> {
        let view = self
            .ledger
            .add(&self.form.to_input())
            .await
            .map_err(|err| op_error(err, "add"))?;
        self.clear();
        Ok(Outcome::Added {
            entity: Entity::Appointment,
            id: view.id,
        })
    }

    pub async fn update(&mut self) -> AppResult<Outcome> {
        let id = self.require_selection("update")?;
        let view = self
            .ledger
            .update(id, &self.form.to_input())
            .await
            .map_err(|err| op_error(err, "update"))?;
        self.form = AppointmentForm::from(&view);
        Ok(Outcome::Updated {
            entity: Entity::Appointment,
            id,
        })
    }

    pub async fn delete(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let id = self.require_selection("delete")?;
        if !confirm.confirm("Delete this appointment?") {
            return Ok(Outcome::Cancelled);
        }
        self.ledger
            .delete(id)
            .await
            .map_err(|err| op_error(err, "delete"))?;
        self.clear();
        Ok(Outcome::Deleted {
            entity: Entity::Appointment,
            id,
        })
    }

    /// Status values offered by the status selector.
    pub fn status_options(&self) -> [AppointmentStatus; 3] {
        AppointmentStatus::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn options() -> Vec<Choice> {
        vec![
            Choice::new(1, "Ivanov Petr"),
            Choice::new(3, "Sidorova Anna Ivanovna"),
        ]
    }

    #[test]
    fn pick_accepts_id_or_display_label() {
        let by_id = pick(&options(), Entity::Guest, "3").expect("pick by id");
        assert_eq!(by_id.map(|c| c.id), Some(3));
        let by_label = pick(&options(), Entity::Guest, "1: Ivanov Petr").expect("pick by label");
        assert_eq!(by_label.map(|c| c.label), Some("Ivanov Petr".to_string()));
        assert_eq!(pick(&options(), Entity::Guest, " ").expect("blank"), None);
    }

    #[test]
    fn pick_rejects_ids_not_offered() {
        let err = pick(&options(), Entity::Guest, "2").expect_err("absent id");
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = pick(&options(), Entity::Service, "Massage").expect_err("no id");
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn form_converts_to_ids() {
        let form = AppointmentForm {
            guest: Some(Choice::new(1, "Ivanov Petr")),
            service: None,
            date: "10.06.2024".into(),
            time: "14:30".into(),
            status: String::new(),
        };
        let input = form.to_input();
        assert_eq!(input.guest, Some(1));
        assert_eq!(input.service, None);
        assert_eq!(input.date, "10.06.2024");
    }
}
