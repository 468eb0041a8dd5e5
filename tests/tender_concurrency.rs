mod common;

use common::*;
use freight_broker::domain::LoadStatus;
use freight_broker::error::ErrorKind;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tenders_single_winner() {
    for _ in 0..20 {
        let h = harness();
        let load = h.service.create_load(dry_van_request("S1")).await.unwrap();
        h.service.request_quote(load.id).await.unwrap();

        let first = {
            let service = h.service.clone();
            tokio::spawn(async move {
                service
                    .create_tender(load.id, tender("C1", dec!(2850)))
                    .await
            })
        };
        let second = {
            let service = h.service.clone();
            tokio::spawn(async move {
                service
                    .create_tender(load.id, tender("C2", dec!(2790)))
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::InvalidState);

        assert_eq!(h.store.tender_count(), 1);
        assert_eq!(
            h.service.get_load(load.id).await.unwrap().status,
            LoadStatus::Tendered
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_quote_requests_single_winner() {
    let h = harness();
    let load = h.service.create_load(dry_van_request("S1")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = h.service.clone();
            tokio::spawn(async move { service.request_quote(load.id).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidState),
        }
    }
    assert_eq!(ok, 1);
}
