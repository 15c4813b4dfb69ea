#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use resortdesk_lib::{
    AppointmentInput, GuestInput, GuestRegistry, ServiceCatalog, ServiceInput, Store,
};

pub async fn memory_store() -> Store {
    Store::open_in_memory()
        .await
        .expect("open in-memory store")
}

pub fn guest(last: &str, first: &str) -> GuestInput {
    GuestInput {
        last_name: last.into(),
        first_name: first.into(),
        ..GuestInput::default()
    }
}

pub fn ivanov() -> GuestInput {
    GuestInput {
        birth_date: "12.04.1980".into(),
        passport: "4510 123456".into(),
        phone: "+7 900 000-00-00".into(),
        check_in_date: "01.06.2024".into(),
        check_out_date: "14.06.2024".into(),
        room: "12".into(),
        ..guest("Ivanov", "Petr")
    }
}

pub fn service(name: &str, price: &str, duration: &str) -> ServiceInput {
    ServiceInput {
        name: name.into(),
        description: String::new(),
        price: price.into(),
        duration: duration.into(),
    }
}

pub fn massage() -> ServiceInput {
    ServiceInput {
        description: "Classic back massage".into(),
        ..service("Massage", "1500", "45")
    }
}

pub fn appointment(guest: i64, service: i64, date: &str, time: &str) -> AppointmentInput {
    AppointmentInput {
        guest: Some(guest),
        service: Some(service),
        date: date.into(),
        time: time.into(),
        status: String::new(),
    }
}

/// One guest (Ivanov) and one service (Massage), ids 1 and 1.
pub async fn seeded_store() -> (Store, i64, i64) {
    let store = memory_store().await;
    let guest = GuestRegistry::new(store.pool().clone())
        .add(&ivanov())
        .await
        .expect("seed guest");
    let service = ServiceCatalog::new(store.pool().clone())
        .add(&massage())
        .await
        .expect("seed service");
    (store, guest.id, service.id)
}

pub async fn count(store: &Store, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .expect("count rows")
}
