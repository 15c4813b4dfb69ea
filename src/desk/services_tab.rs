use sqlx::SqlitePool;

use super::{unknown_field, Confirm, Outcome};
use crate::error::{AppError, AppResult, DeskError, Entity};
use crate::services::{Service, ServiceCatalog, ServiceInput};

pub const SERVICE_FIELDS: &[&str] = &["name", "description", "price", "duration"];

fn field_mut<'a>(form: &'a mut ServiceInput, field: &str) -> Option<&'a mut String> {
    match field {
        "name" => Some(&mut form.name),
        "description" => Some(&mut form.description),
        "price" => Some(&mut form.price),
        "duration" => Some(&mut form.duration),
        _ => None,
    }
}

fn op_error(err: DeskError, operation: &'static str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", "services")
}

pub struct ServiceTab {
    catalog: ServiceCatalog,
    pub form: ServiceInput,
    selected: Option<i64>,
    rows: Vec<Service>,
}

impl ServiceTab {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            catalog: ServiceCatalog::new(pool),
            form: ServiceInput::default(),
            selected: None,
            rows: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn rows(&self) -> &[Service] {
        &self.rows
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub async fn refresh(&mut self) -> AppResult<()> {
        self.rows = self
            .catalog
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

    pub fn select(&mut self, id: i64) -> AppResult<()> {
        let row = self
            .rows
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| {
                op_error(
                    DeskError::NotFound {
                        entity: Entity::Service,
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
        self.form = ServiceInput::default();
        self.selected = None;
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        let slot = field_mut(&mut self.form, field)
            .ok_or_else(|| unknown_field(Entity::Service, field))?;
        *slot = value.to_string();
        Ok(())
    }

    fn require_selection(&self, operation: &'static str) -> AppResult<i64> {
        self.selected
            .ok_or_else(|| op_error(DeskError::NothingSelected(Entity::Service), operation))
    }

    /// Price and duration are parsed before anything is written.
    pub async fn add(&mut self) -> AppResult<Outcome> {
        let service = self
            .catalog
            .add(&self.form)
            .await
            .map_err(|err| op_error(err, "add"))?;
        self.clear();
        Ok(Outcome::Added {
            entity: Entity::Service,
            id: service.id,
        })
    }

    pub async fn update(&mut self) -> AppResult<Outcome> {
        let id = self.require_selection("update")?;
        self.catalog
            .update(id, &self.form)
            .await
            .map_err(|err| op_error(err, "update"))?;
        Ok(Outcome::Updated {
            entity: Entity::Service,
            id,
        })
    }

    pub async fn delete(&mut self, confirm: &mut dyn Confirm) -> AppResult<Outcome> {
        let id = self.require_selection("delete")?;
        self.catalog
            .ensure_unreferenced(id)
            .await
            .map_err(|err| op_error(err, "delete"))?;
        if !confirm.confirm("Delete this service?") {
            return Ok(Outcome::Cancelled);
        }
        self.catalog
            .delete(id)
            .await
            .map_err(|err| op_error(err, "delete"))?;
        self.clear();
        Ok(Outcome::Deleted {
            entity: Entity::Service,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::FORM_UNKNOWN_FIELD;

    #[tokio::test]
    async fn unknown_field_is_rejected() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .expect("lazy pool");
        let mut tab = ServiceTab::new(pool);
        tab.set_field("price", "1500").expect("price");
        assert_eq!(tab.form.price, "1500");
        let err = tab.set_field("colour", "red").expect_err("no such field");
        assert_eq!(err.code(), FORM_UNKNOWN_FIELD);
    }
}
