mod common;

use common::*;
use freight_broker::domain::{CreateTender, LoadFilter, LoadStatus, UpdateLoad};
use freight_broker::error::{BrokerError, ErrorKind};
use freight_broker::events::{LOAD_CREATED, LOAD_QUOTE_REQUESTED, LOAD_TENDERED};
use freight_broker::service::FixedClock;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

#[tokio::test]
async fn test_create_quote_tender_lifecycle() {
    let h = harness();

    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
    assert_eq!(load.status, LoadStatus::Created);
    assert_eq!(load.weight_lbs, dec!(45000));

    h.service.request_quote(load.id).await.unwrap();
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Quoted
    );

    let tender_id = h
        .service
        .create_tender(load.id, tender("C1", dec!(2850)))
        .await
        .unwrap();
    let stored = h.service.get_load(load.id).await.unwrap();
    assert_eq!(stored.status, LoadStatus::Tendered);

    let tenders = h.service.list_tenders(load.id).await.unwrap();
    assert_eq!(tenders.len(), 1);
    assert_eq!(tenders[0].id, tender_id);
    assert_eq!(tenders[0].carrier_id, "C1");
    assert_eq!(tenders[0].price_usd, dec!(2850));
    assert_eq!(tenders[0].expires_at, ts("2024-01-21T00:00Z"));

    let err = h.service.request_quote(load.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("Quote can only be requested for created loads"));

    let names = wait_for_events(&h.events, 3).await;
    assert_eq!(names, vec![LOAD_CREATED, LOAD_QUOTE_REQUESTED, LOAD_TENDERED]);
}

#[tokio::test]
async fn test_created_event_carries_shipper() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();

    wait_for_events(&h.events, 1).await;
    let event = &h.events.events()[0];
    assert_eq!(event.load_id, load.id);
    assert_eq!(event.payload["shipper_id"], "S1");
    assert_eq!(event.payload["load_id"], load.id.to_string());
}

#[tokio::test]
async fn test_create_load_rejects_unknown_references() {
    let h = harness();

    let err = h
        .service
        .create_load(dry_van_request("S404"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status_code(), 404);

    let mut request = dry_van_request("S1");
    request.equipment_code = "HOVERCRAFT".into();
    let err = h.service.create_load(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("Invalid equipment type: HOVERCRAFT"));

    assert_eq!(h.store.load_count(), 0);
}

#[tokio::test]
async fn test_create_load_validation() {
    let h = harness();

    let mut request = dry_van_request("S1");
    request.weight_lbs = dec!(0);
    assert_eq!(
        h.service.create_load(request).await.unwrap_err().kind(),
        ErrorKind::InvalidInput
    );

    let mut request = dry_van_request("S1");
    request.delivery_latest = request.pickup_earliest;
    assert_eq!(
        h.service.create_load(request).await.unwrap_err().kind(),
        ErrorKind::InvalidInput
    );

    let mut request = dry_van_request("S1");
    request.weight_lbs = dec!(0.004);
    assert_eq!(
        h.service.create_load(request).await.unwrap_err().kind(),
        ErrorKind::InvalidInput
    );

    let mut request = dry_van_request("S1");
    request.origin.zip = " ".into();
    assert_eq!(
        h.service.create_load(request).await.unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

#[tokio::test]
async fn test_get_load_is_idempotent() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();

    let first = h.service.get_load(load.id).await.unwrap();
    let second = h.service.get_load(load.id).await.unwrap();
    assert_eq!(first, second);

    let err = h.service.get_load(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, BrokerError::NotFound { entity: "Load", .. }));
}

#[tokio::test]
async fn test_update_load_merges_fields_but_not_status() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.request_quote(load.id).await.unwrap();

    let updated = h
        .service
        .update_load(
            load.id,
            UpdateLoad {
                commodity: Some("Brake rotors".into()),
                weight_lbs: Some(dec!(38000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.commodity, "Brake rotors");
    assert_eq!(updated.weight_lbs, dec!(38000));
    assert_eq!(updated.status, LoadStatus::Quoted);
    assert_eq!(updated.created_at, load.created_at);

    let err = h
        .service
        .update_load(
            load.id,
            UpdateLoad {
                equipment_code: Some("HOVERCRAFT".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = h
        .service
        .update_load(
            load.id,
            UpdateLoad {
                delivery_latest: Some(ts("2024-01-19T00:00Z")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().delivery_latest,
        ts("2024-01-22T14:00Z")
    );
}

#[tokio::test]
async fn test_tender_requires_quoted_load() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();

    let err = h
        .service
        .create_tender(load.id, tender("C1", dec!(2850)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(err.to_string().contains("Tender can only be created for quoted loads"));
    assert_eq!(h.store.tender_count(), 0);
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Created
    );

    h.service.request_quote(load.id).await.unwrap();
    h.service
        .create_tender(load.id, tender("C1", dec!(2850)))
        .await
        .unwrap();
    let err = h
        .service
        .create_tender(load.id, tender("C2", dec!(2790)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.store.tender_count(), 1);
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Tendered
    );

    let err = h
        .service
        .create_tender(Uuid::new_v4(), tender("C1", dec!(2850)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unknown_carrier_creates_no_tender() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.request_quote(load.id).await.unwrap();

    let err = h
        .service
        .create_tender(load.id, tender("C404", dec!(2850)))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::NotFound { entity: "Carrier", .. }));
    assert_eq!(h.store.tender_count(), 0);
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Quoted
    );
}

#[tokio::test]
async fn test_tender_rejects_bad_price_and_expiry() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.request_quote(load.id).await.unwrap();

    let err = h
        .service
        .create_tender(load.id, tender("C1", dec!(0)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let past = CreateTender {
        carrier_id: "C1".into(),
        price_usd: dec!(2850),
        expires_at: "2024-01-18T00:00Z".into(),
    };
    let err = h.service.create_tender(load.id, past).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = h
        .service
        .create_tender(load.id, tender("C1", dec!(2850.555)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.status_code(), 400);

    let garbled = CreateTender {
        carrier_id: "C1".into(),
        price_usd: dec!(2850),
        expires_at: "next tuesday".into(),
    };
    let err = h.service.create_tender(load.id, garbled).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(h.store.tender_count(), 0);
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Quoted
    );
}

#[tokio::test]
async fn test_delete_load_policy() {
    let h = harness();

    let fresh = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.delete_load(fresh.id).await.unwrap();
    assert_eq!(
        h.service.get_load(fresh.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        h.service.delete_load(fresh.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    let tendered = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.request_quote(tendered.id).await.unwrap();
    h.service
        .create_tender(tendered.id, tender("C1", dec!(2850)))
        .await
        .unwrap();
    let err = h.service.delete_load(tendered.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(h.service.get_load(tendered.id).await.is_ok());
}

#[tokio::test]
async fn test_list_loads_pagination() {
    let h = harness();
    for _ in 0..25 {
        h.service.create_load(dry_van_request("S1")).await.unwrap();
    }

    let page = h
        .service
        .list_loads(2, 10, &LoadFilter::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.limit, 10);
    assert_eq!(page.pagination.total, 25);
    assert_eq!(page.pagination.total_pages, 3);

    let last = h
        .service
        .list_loads(3, 10, &LoadFilter::default())
        .await
        .unwrap();
    assert_eq!(last.data.len(), 5);

    let beyond = h
        .service
        .list_loads(4, 10, &LoadFilter::default())
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.pagination.total, 25);

    let err = h
        .service
        .list_loads(0, 10, &LoadFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_list_loads_filters() {
    let h = harness();
    let quoted = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.create_load(dry_van_request("S2")).await.unwrap();
    h.service.request_quote(quoted.id).await.unwrap();

    let by_shipper = h
        .service
        .list_loads_default(&LoadFilter::by_shipper("S1"))
        .await
        .unwrap();
    assert_eq!(by_shipper.pagination.total, 2);
    assert_eq!(by_shipper.pagination.limit, h.service.listing().default_limit);

    let by_status = h
        .service
        .list_loads_default(&LoadFilter::by_status(LoadStatus::Quoted))
        .await
        .unwrap();
    assert_eq!(by_status.pagination.total, 1);
    assert_eq!(by_status.data[0].id, quoted.id);
}

#[tokio::test]
async fn test_emitter_failure_does_not_fail_operations() {
    let h = harness_with_emitter(Some(Arc::new(FailingEmitter)));

    let load = assert_ok!(h.service.create_load(dry_van_request("S1")).await);
    assert_ok!(h.service.request_quote(load.id).await);
    assert_ok!(
        h.service
            .create_tender(load.id, tender("C1", dec!(2850)))
            .await
    );
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(
        h.service.get_load(load.id).await.unwrap().status,
        LoadStatus::Tendered
    );
}

#[tokio::test]
async fn test_storage_fault_propagates() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();

    h.store.set_unavailable(true);
    let err = assert_err!(h.service.request_quote(load.id).await);
    assert_eq!(err.kind(), ErrorKind::StorageFault);
    assert_eq!(err.status_code(), 500);
    assert!(err.is_retryable());

    h.store.set_unavailable(false);
    h.service.request_quote(load.id).await.unwrap();
}

#[tokio::test]
async fn test_active_tenders_drop_expired() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
    h.service.request_quote(load.id).await.unwrap();
    h.service
        .create_tender(load.id, tender("C1", dec!(2850)))
        .await
        .unwrap();

    assert_eq!(h.service.active_tenders(load.id).await.unwrap().len(), 1);

    let later = h
        .service
        .clone()
        .with_clock(Arc::new(FixedClock(ts("2024-01-21T00:00Z"))));
    assert!(later.active_tenders(load.id).await.unwrap().is_empty());
    assert_eq!(later.list_tenders(load.id).await.unwrap().len(), 1);
}
