use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use thiserror::Error;

use crate::choice::{full_name, Choice};
use crate::error::{DeskError, DeskResult, Entity};
use crate::parse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Blank means "not chosen yet" and falls back to [`AppointmentStatus::Scheduled`].
    pub fn from_form(value: &str) -> DeskResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(AppointmentStatus::default());
        }
        trimmed
            .parse()
            .map_err(|_| DeskError::format("status", value, "Scheduled, Completed or Cancelled"))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid appointment status: {value}")]
pub struct StatusParseError {
    value: String,
}

impl FromStr for AppointmentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StatusParseError {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment form contents. Guest and service are the ids of the chosen selector entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentInput {
    pub guest: Option<i64>,
    pub service: Option<i64>,
    pub date: String,
    pub time: String,
    pub status: String,
}

/// A validated appointment, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AppointmentRecord {
    guest_id: i64,
    service_id: i64,
    date: String,
    time: String,
    status: AppointmentStatus,
}

/// A listed appointment, joined with its guest and service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: i64,
    pub guest: Choice,
    pub service: Choice,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
}

impl AppointmentView {
    /// The row's fields in editable form.
    pub fn to_input(&self) -> AppointmentInput {
        AppointmentInput {
            guest: Some(self.guest.id),
            service: Some(self.service.id),
            date: self.date.clone(),
            time: self.time.clone(),
            status: self.status.to_string(),
        }
    }
}

impl TryFrom<&SqliteRow> for AppointmentView {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let text = |column: &str| -> Result<String, sqlx::Error> {
            Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
        };
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<AppointmentStatus>()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self {
            id: row.try_get("id")?,
            guest: Choice::new(
                row.try_get("guest_id")?,
                full_name(
                    &text("last_name")?,
                    &text("first_name")?,
                    &text("middle_name")?,
                ),
            ),
            service: Choice::new(row.try_get("service_id")?, text("service_name")?),
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            status,
        })
    }
}

const SELECT_VIEWS: &str = "SELECT a.id, a.guest_id, g.last_name, g.first_name, g.middle_name, \
     a.service_id, s.name AS service_name, a.date, a.time, a.status \
     FROM appointments a \
     JOIN guests g ON a.guest_id = g.id \
     JOIN services s ON a.service_id = s.id";

/// CRUD over the `appointments` table.
#[derive(Debug, Clone)]
pub struct AppointmentLedger {
    pool: SqlitePool,
}

impl AppointmentLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn validate(&self, input: &AppointmentInput) -> DeskResult<AppointmentRecord> {
        let guest_id = input
            .guest
            .ok_or(DeskError::SelectionRequired(Entity::Guest))?;
        let service_id = input
            .service
            .ok_or(DeskError::SelectionRequired(Entity::Service))?;
        let status = AppointmentStatus::from_form(&input.status)?;
        let (date, _) = parse::date(&input.date)?;
        let (time, _) = parse::time(&input.time)?;

        self.ensure_exists("guests", Entity::Guest, guest_id).await?;
        self.ensure_exists("services", Entity::Service, service_id)
            .await?;

        Ok(AppointmentRecord {
            guest_id,
            service_id,
            date,
            time,
            status,
        })
    }

    async fn ensure_exists(&self, table: &str, entity: Entity, id: i64) -> DeskResult<()> {
        let sql = format!("SELECT 1 FROM {table} WHERE id = ?");
        let found: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(DeskError::UnknownReference { entity, id }),
        }
    }

    pub async fn add(&self, input: &AppointmentInput) -> DeskResult<AppointmentView> {
        let record = self.validate(input).await?;
        let res = sqlx::query(
            "INSERT INTO appointments (guest_id, service_id, date, time, status) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.guest_id)
        .bind(record.service_id)
        .bind(&record.date)
        .bind(&record.time)
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await?;

        let id = res.last_insert_rowid();
        tracing::info!(
            target: "resortdesk",
            event = "appointment_added",
            id,
            guest_id = record.guest_id,
            service_id = record.service_id
        );
        self.fetch(id).await
    }

    pub async fn update(&self, id: i64, input: &AppointmentInput) -> DeskResult<AppointmentView> {
        let record = self.validate(input).await?;
        let res = sqlx::query(
            "UPDATE appointments SET guest_id = ?, service_id = ?, date = ?, time = ?, status = ? \
             WHERE id = ?",
        )
        .bind(record.guest_id)
        .bind(record.service_id)
        .bind(&record.date)
        .bind(&record.time)
        .bind(record.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Appointment,
                id,
            });
        }
        tracing::info!(
            target: "resortdesk",
            event = "appointment_updated",
            id,
            status = record.status.as_str()
        );
        self.fetch(id).await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        let res = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(DeskError::NotFound {
                entity: Entity::Appointment,
                id,
            });
        }
        tracing::info!(target: "resortdesk", event = "appointment_deleted", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> DeskResult<Option<AppointmentView>> {
        let sql = format!("{SELECT_VIEWS} WHERE a.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(AppointmentView::try_from).transpose()?)
    }

    async fn fetch(&self, id: i64) -> DeskResult<AppointmentView> {
        self.get(id).await?.ok_or(DeskError::NotFound {
            entity: Entity::Appointment,
            id,
        })
    }

    /// Appointments joined with guest name and service name, in storage order.
    pub async fn list(&self) -> DeskResult<Vec<AppointmentView>> {
        let sql = format!("{SELECT_VIEWS} ORDER BY a.id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let views = rows
            .iter()
            .map(AppointmentView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "completed".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Completed)
        );
        assert_eq!(
            "Cancelled".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Cancelled)
        );
        assert!("Done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn blank_status_defaults_to_scheduled() {
        assert_eq!(
            AppointmentStatus::from_form("  ").expect("blank"),
            AppointmentStatus::Scheduled
        );
        let err = AppointmentStatus::from_form("Pending").expect_err("unknown status");
        assert_eq!(err.kind(), crate::error::ErrorKind::Format);
    }

    #[test]
    fn status_display_matches_stored_text() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.to_string().parse::<AppointmentStatus>(), Ok(status));
        }
    }
}
