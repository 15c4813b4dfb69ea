use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::choice::Choice;
use crate::error::{DeskError, DeskResult, Entity};
use crate::parse;

/// Service form fields as typed by the user; price and duration are parsed on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: String,
}

impl ServiceInput {
    fn parse(&self) -> DeskResult<(f64, i64)> {
        let price = parse::price(&self.price)?;
        let duration = parse::duration(&self.duration)?;
        Ok((price, duration))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration: i64,
}

impl Service {
    pub fn choice(&self) -> Choice {
        Choice::new(self.id, self.name.clone())
    }

    pub fn to_input(&self) -> ServiceInput {
        ServiceInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: format_price(self.price),
            duration: self.duration.to_string(),
        }
    }
}

/// Whole prices print without a trailing `.0`.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{price:.0}")
    } else {
        price.to_string()
    }
}

impl TryFrom<&SqliteRow> for Service {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row
                .try_get::<Option<String>, _>("description")?
                .unwrap_or_default(),
            price: row.try_get("price")?,
            duration: row.try_get::<Option<i64>, _>("duration")?.unwrap_or_default(),
        })
    }
}

/// CRUD over the `services` table.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    pool: SqlitePool,
}

impl ServiceCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, input: &ServiceInput) -> DeskResult<Service> {
        let (price, duration) = input.parse()?;
        let res = sqlx::query(
            "INSERT INTO services (name, description, price, duration) VALUES (?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(price)
        .bind(duration)
        .execute(&self.pool)
        .await?;

        let id = res.last_insert_rowid();
        tracing::info!(target: "resortdesk", event = "service_added", id, price, duration);
        Ok(Service {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price,
            duration,
        })
    }

    pub async fn update(&self, id: i64, input: &ServiceInput) -> DeskResult<Service> {
        let (price, duration) = input.parse()?;
        let res = sqlx::query(
            "UPDATE services SET name = ?, description = ?, price = ?, duration = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(price)
        .bind(duration)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Service,
                id,
            });
        }
        tracing::info!(target: "resortdesk", event = "service_updated", id);
        Ok(Service {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price,
            duration,
        })
    }

    pub async fn reference_count(&self, id: i64) -> DeskResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE service_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    pub async fn ensure_unreferenced(&self, id: i64) -> DeskResult<()> {
        let count = self.reference_count(id).await?;
        if count > 0 {
            tracing::warn!(target: "resortdesk", event = "service_delete_blocked", id, count);
            return Err(DeskError::StillReferenced {
                entity: Entity::Service,
                id,
                count,
            });
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.ensure_unreferenced(id).await?;
        let res = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Service,
                id,
            });
        }
        tracing::info!(target: "resortdesk", event = "service_deleted", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> DeskResult<Option<Service>> {
        let row = sqlx::query(
            "SELECT id, name, description, price, duration FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(Service::try_from).transpose()?)
    }

    pub async fn exists(&self, id: i64) -> DeskResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn list(&self) -> DeskResult<Vec<Service>> {
        let rows =
            sqlx::query("SELECT id, name, description, price, duration FROM services ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let services = rows
            .iter()
            .map(Service::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    pub async fn choices(&self) -> DeskResult<Vec<Choice>> {
        Ok(self.list().await?.iter().map(Service::choice).collect())
    }
}
