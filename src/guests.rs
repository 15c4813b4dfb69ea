use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::choice::{full_name, Choice};
use crate::error::{DeskError, DeskResult, Entity};

/// Editable guest fields. Every field is free text; empty strings are stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInput {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub birth_date: String,
    pub passport: String,
    pub phone: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub room: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: i64,
    #[serde(flatten)]
    pub fields: GuestInput,
}

impl Guest {
    /// "Last First Middle", the label used by the appointment selectors.
    pub fn full_name(&self) -> String {
        full_name(
            &self.fields.last_name,
            &self.fields.first_name,
            &self.fields.middle_name,
        )
    }

    pub fn choice(&self) -> Choice {
        Choice::new(self.id, self.full_name())
    }

    /// The row's fields in editable form.
    pub fn to_input(&self) -> GuestInput {
        self.fields.clone()
    }
}

impl TryFrom<&SqliteRow> for Guest {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let text = |column: &str| -> Result<String, sqlx::Error> {
            Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
        };
        Ok(Self {
            id: row.try_get("id")?,
            fields: GuestInput {
                last_name: text("last_name")?,
                first_name: text("first_name")?,
                middle_name: text("middle_name")?,
                birth_date: text("birth_date")?,
                passport: text("passport")?,
                phone: text("phone")?,
                check_in_date: text("check_in_date")?,
                check_out_date: text("check_out_date")?,
                room: text("room")?,
                notes: text("notes")?,
            },
        })
    }
}

const SELECT_GUESTS: &str = "SELECT id, last_name, first_name, middle_name, birth_date, passport, \
     phone, check_in_date, check_out_date, room, notes FROM guests";

/// CRUD over the `guests` table.
#[derive(Debug, Clone)]
pub struct GuestRegistry {
    pool: SqlitePool,
}

impl GuestRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, input: &GuestInput) -> DeskResult<Guest> {
        let res = sqlx::query(
            "INSERT INTO guests (last_name, first_name, middle_name, birth_date, passport, phone, \
             check_in_date, check_out_date, room, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(&input.middle_name)
        .bind(&input.birth_date)
        .bind(&input.passport)
        .bind(&input.phone)
        .bind(&input.check_in_date)
        .bind(&input.check_out_date)
        .bind(&input.room)
        .bind(&input.notes)
        .execute(&self.pool)
        .await?;

        let id = res.last_insert_rowid();
        tracing::info!(target: "resortdesk", event = "guest_added", id);
        Ok(Guest {
            id,
            fields: input.clone(),
        })
    }

    pub async fn update(&self, id: i64, input: &GuestInput) -> DeskResult<Guest> {
        let res = sqlx::query(
            "UPDATE guests SET last_name = ?, first_name = ?, middle_name = ?, birth_date = ?, \
             passport = ?, phone = ?, check_in_date = ?, check_out_date = ?, room = ?, notes = ? \
             WHERE id = ?",
        )
        .bind(&input.last_name)
        .bind(&input.first_name)
        .bind(&input.middle_name)
        .bind(&input.birth_date)
        .bind(&input.passport)
        .bind(&input.phone)
        .bind(&input.check_in_date)
        .bind(&input.check_out_date)
        .bind(&input.room)
        .bind(&input.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Guest,
                id,
            });
        }
        tracing::info!(target: "resortdesk", event = "guest_updated", id);
        Ok(Guest {
            id,
            fields: input.clone(),
        })
    }

    /// Appointments that still point at this guest.
    pub async fn reference_count(&self, id: i64) -> DeskResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE guest_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fails with [`DeskError::StillReferenced`] while any appointment uses the guest.
    pub async fn ensure_unreferenced(&self, id: i64) -> DeskResult<()> {
        let count = self.reference_count(id).await?;
        if count > 0 {
            tracing::warn!(target: "resortdesk", event = "guest_delete_blocked", id, count);
            return Err(DeskError::StillReferenced {
                entity: Entity::Guest,
                id,
                count,
            });
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.ensure_unreferenced(id).await?;
        let res = sqlx::query("DELETE FROM guests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Guest,
                id,
            });
        }
        tracing::info!(target: "resortdesk", event = "guest_deleted", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> DeskResult<Option<Guest>> {
        let sql = format!("{SELECT_GUESTS} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Guest::try_from).transpose()?)
    }

    pub async fn exists(&self, id: i64) -> DeskResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM guests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// All guests in storage order.
    pub async fn list(&self) -> DeskResult<Vec<Guest>> {
        let sql = format!("{SELECT_GUESTS} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let guests = rows
            .iter()
            .map(Guest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(guests)
    }

    /// Selector entries for the appointment form.
    pub async fn choices(&self) -> DeskResult<Vec<Choice>> {
        Ok(self.list().await?.iter().map(Guest::choice).collect())
    }
}
