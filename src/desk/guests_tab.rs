use sqlx::SqlitePool;

use super::{unknown_field, Confirm, Outcome};
use crate::error::{AppError, AppResult, DeskError, Entity};
use crate::guests::{Guest, GuestInput, GuestRegistry};

pub const GUEST_FIELDS: &[&str] = &[
    "last_name",
    "first_name",
    "middle_name",
    "birth_date",
    "passport",
    "phone",
    "check_in_date",
    "check_out_date",
    "room",
    "notes",
];

fn field_mut<'a>(form: &'a mut GuestInput, field: &str) -> Option<&'a mut String> {
    let slot = match field {
        "last_name" => &mut form.last_name,
        "first_name" => &mut form.first_name,
        "middle_name" => &mut form.middle_name,
        "birth_date" => &mut form.birth_date,
        "passport" => &mut form.passport,
        "phone" => &mut form.phone,
        "check_in_date" => &mut form.check_in_date,
        "check_out_date" => &mut form.check_out_date,
        "room" => &mut form.room,
        "notes" => &mut form.notes,
        _ => return None,
    };
    Some(slot)
}

fn op_error(err: DeskError, operation: &'static str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", "guests")
}

pub struct GuestTab {
    registry: GuestRegistry,
    pub form: GuestInput,
    selected: Option<i64>,
    rows: Vec<Guest>,
}

impl GuestTab {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            registry: GuestRegistry::new(pool),
            form: GuestInput::default(),
            selected: None,
            rows: Vec::new(),
        }
    }

    pub fn registry(&self) -> &GuestRegistry {
        &self.registry
    }

    pub fn rows(&self) -> &[Guest] {
        &self.rows
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub async fn refresh(&mut self) -> AppResult<()> {
        self.rows = self
            .registry
            .list()
            .await
            .map_err(|err| op_error(err, "list"))?;
        if let Some(id) = self.selected {
            if !self.rows.iter().any(|row| row.id == id) {
                self.selected = None;
            }
        }
        Ok(())
    }

    /// Loads a listed row into the form.
    pub fn select(&mut self, id: i64) -> AppResult<()> {
        let row = self
            .rows
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| {
                op_error(
                    DeskError::NotFound {
                        entity: Entity::Guest,
                        id,
                    },
                    "select",
                )
            })?;
        self.form = row.to_input();
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.form = GuestInput::default();
        self.selected = None;
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        let slot = field_mut(&mut self.form, field)
            .ok_or_else(|| unknown_field(Entity::Guest, field))?;
        *slot = value.to_string();
        Ok(())
    }

    fn require_selection(&self, operation: &'static str) -> AppResult<i64> {
        self.selected
            .ok_or_else(|| op_error(DeskError::NothingSelected(Entity::Guest), operation))
    }

    pub async fn add(&mut self) -> AppResult<Outcome> {
        let guest = self
            .registry
            .add(&self.form)
            .await
            .map_err(|err| op_error(err, "add"))?;
        self.clear();
        Ok(Outcome::Added {
            entity: Entity::Guest,
            id: guest.id,
        })
    }

    pub async fn update(&mut self) -> AppResult<Outcome> {
        let id = self.require_selection("update")?;
        self.registry
            .update(id, &self.form)
            .await
            .map_err(|err| op_error(err, "update"))?;
        Ok(Outcome::Updated {
            entity: Entity::Guest,
            id,
        })
    }

    /// Refuses while appointments reference the guest, then asks before deleting.
    pub async fn delete(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let id = self.require_selection("delete")?;
        self.registry
            .ensure_unreferenced(id)
            .await
            .map_err(|err| op_error(err, "delete"))?;
        if !confirm.confirm("Delete this guest?") {
            return Ok(Outcome::Cancelled);
        }
        self.registry
            .delete(id)
            .await
            .map_err(|err| op_error(err, "delete"))?;
        self.clear();
        Ok(Outcome::Deleted {
            entity: Entity::Guest,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_field_is_settable() {
        let mut form = GuestInput::default();
        for field in GUEST_FIELDS {
            let slot = field_mut(&mut form, field).expect("known field");
            *slot = field.to_string();
        }
        assert_eq!(form.last_name, "last_name");
        assert_eq!(form.notes, "notes");
        assert!(field_mut(&mut form, "email").is_none());
    }
}
