#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use resortdesk_lib::{AppointmentLedger, DeskError, Entity, ErrorKind, ServiceCatalog};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn massage_is_deletable_until_booked() -> Result<()> {
    let (store, guest_id, _) = util::seeded_store().await;
    let catalog = ServiceCatalog::new(store.pool().clone());
    let ledger = AppointmentLedger::new(store.pool().clone());

    let spare = catalog.add(&util::massage()).await?;
    assert_eq!(spare.price, 1500.0);
    assert_eq!(spare.duration, 45);
    catalog.delete(spare.id).await?;
    assert!(catalog.get(spare.id).await?.is_none());

    let booked = catalog.add(&util::massage()).await?;
    ledger
        .add(&util::appointment(guest_id, booked.id, "10.06.2024", "14:30"))
        .await?;
    let err = catalog.delete(booked.id).await.expect_err("booked service");
    assert!(matches!(
        err,
        DeskError::StillReferenced {
            entity: Entity::Service,
            count: 1,
            ..
        }
    ));
    assert!(catalog.exists(booked.id).await?);
    Ok(())
}

#[tokio::test]
async fn bad_price_writes_nothing() -> Result<()> {
    let store = util::memory_store().await;
    let catalog = ServiceCatalog::new(store.pool().clone());

    for price in ["abc", "", "-10", "1,5"] {
        let err = catalog
            .add(&util::service("Sauna", price, "60"))
            .await
            .expect_err("invalid price");
        assert_eq!(err.kind(), ErrorKind::Format, "price {price:?}");
    }
    assert_eq!(util::count(&store, "services").await, 0);
    Ok(())
}

#[tokio::test]
async fn duration_must_be_whole_minutes() -> Result<()> {
    let store = util::memory_store().await;
    let catalog = ServiceCatalog::new(store.pool().clone());

    let err = catalog
        .add(&util::service("Sauna", "300", "1.5"))
        .await
        .expect_err("fractional duration");
    assert!(matches!(err, DeskError::Format { field: "duration", .. }));

    let odd = catalog.add(&util::service("Refund", "0", "-5")).await?;
    assert_eq!(odd.duration, -5);
    assert_eq!(util::count(&store, "services").await, 1);
    Ok(())
}

#[tokio::test]
async fn update_rejects_bad_numbers_before_touching_the_row() -> Result<()> {
    let store = util::memory_store().await;
    let catalog = ServiceCatalog::new(store.pool().clone());
    let sauna = catalog.add(&util::service("Sauna", "300", "60")).await?;

    let mut edited = sauna.to_input();
    edited.name = "Finnish sauna".into();
    edited.price = "three hundred".into();
    catalog
        .update(sauna.id, &edited)
        .await
        .expect_err("bad price");

    let stored = catalog.get(sauna.id).await?.expect("stored service");
    assert_eq!(stored.name, "Sauna");

    edited.price = "350.50".into();
    let updated = catalog.update(sauna.id, &edited).await?;
    assert_eq!(updated.price, 350.5);
    let stored = catalog.get(sauna.id).await?.expect("stored service");
    assert_eq!(stored.name, "Finnish sauna");
    assert_eq!(stored.to_input().price, "350.5");
    Ok(())
}

#[tokio::test]
async fn choices_use_service_names() -> Result<()> {
    let store = util::memory_store().await;
    let catalog = ServiceCatalog::new(store.pool().clone());
    catalog.add(&util::massage()).await?;
    catalog.add(&util::service("Sauna", "300", "60")).await?;

    let labels: Vec<String> = catalog
        .choices()
        .await?
        .iter()
        .map(|choice| choice.display_label())
        .collect();
    assert_eq!(labels, ["1: Massage", "2: Sauna"]);
    Ok(())
}
