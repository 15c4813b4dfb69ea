use sqlx::SqlitePool;

/// Table name and its idempotent DDL, in creation order.
pub const TABLES: &[(&str, &str)] = &[
    (
        "guests",
        "CREATE TABLE IF NOT EXISTS guests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT,
            birth_date TEXT,
            passport TEXT,
            phone TEXT,
            check_in_date TEXT,
            check_out_date TEXT,
            room TEXT,
            notes TEXT
        )",
    ),
    (
        "services",
        "CREATE TABLE IF NOT EXISTS services (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL,
            duration INTEGER
        )",
    ),
    (
        "appointments",
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guest_id INTEGER NOT NULL,
            service_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Scheduled',
            FOREIGN KEY (guest_id) REFERENCES guests (id),
            FOREIGN KEY (service_id) REFERENCES services (id)
        )",
    ),
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, ddl) in TABLES {
        sqlx::query(*ddl).execute(pool).await?;
        tracing::debug!(target: "resortdesk", event = "schema_table_ready", table = *name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect sqlite::memory:");

        ensure_schema(&pool).await.expect("first run");
        sqlx::query("INSERT INTO guests (last_name, first_name) VALUES ('Ivanov', 'Petr')")
            .execute(&pool)
            .await
            .expect("insert guest");
        ensure_schema(&pool).await.expect("second run");

        let guests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guests")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(guests, 1);
    }

    #[tokio::test]
    async fn status_defaults_to_scheduled() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect sqlite::memory:");
        ensure_schema(&pool).await.expect("schema");

        sqlx::query("INSERT INTO guests (last_name, first_name) VALUES ('A', 'B')")
            .execute(&pool)
            .await
            .expect("guest");
        sqlx::query("INSERT INTO services (name, price) VALUES ('Bath', 10)")
            .execute(&pool)
            .await
            .expect("service");
        sqlx::query("INSERT INTO appointments (guest_id, service_id, date, time) VALUES (1, 1, '01.01.2025', '10:00')")
            .execute(&pool)
            .await
            .expect("appointment");

        let status: String = sqlx::query_scalar("SELECT status FROM appointments WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("status");
        assert_eq!(status, "Scheduled");
    }
}
