mod common;

use anyhow::Result;
use common::{deposit, fund, owner, test_service};
use saldo::application::HistoryRequest;
use saldo::domain::EntryId;
use std::collections::HashSet;

#[tokio::test]
async fn test_two_page_walk_over_25_entries() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for i in 0..25 {
        fund(&service, alice, "USD", 100 + i).await?;
    }

    let first = service
        .history(
            alice,
            HistoryRequest {
                limit: Some(10),
                offset: Some(0),
            },
        )
        .await?;
    assert_eq!(first.entries.len(), 10);
    assert_eq!(first.total, 25);

    let second = service
        .history(
            alice,
            HistoryRequest {
                limit: Some(10),
                offset: Some(10),
            },
        )
        .await?;
    assert_eq!(second.entries.len(), 10);
    assert_eq!(second.total, 25);

    // Pages do not overlap.
    let first_ids: HashSet<EntryId> = first.entries.iter().map(|e| e.id).collect();
    assert!(second.entries.iter().all(|e| !first_ids.contains(&e.id)));

    Ok(())
}

#[tokio::test]
async fn test_concatenated_pages_reproduce_full_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for i in 0..25 {
        fund(&service, alice, "USD", 1 + i).await?;
    }

    let mut collected = Vec::new();
    let mut offset = 0;
    loop {
        let page = service
            .history(
                alice,
                HistoryRequest {
                    limit: Some(10),
                    offset: Some(offset),
                },
            )
            .await?;
        assert_eq!(page.total, 25);
        if page.entries.is_empty() {
            break;
        }
        offset += page.entries.len() as u32;
        collected.extend(page.entries);
    }

    // Every entry exactly once...
    assert_eq!(collected.len(), 25);
    let unique: HashSet<EntryId> = collected.iter().map(|e| e.id).collect();
    assert_eq!(unique.len(), 25);

    // ...ordered most-recent-first.
    assert!(
        collected
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );

    Ok(())
}

#[tokio::test]
async fn test_limit_defaults_to_ten() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for _ in 0..15 {
        fund(&service, alice, "USD", 100).await?;
    }

    let unset = service.history(alice, HistoryRequest::default()).await?;
    assert_eq!(unset.entries.len(), 10);
    assert_eq!(unset.limit, 10);

    // A zero limit falls back to the default rather than an empty page.
    let zero = service
        .history(
            alice,
            HistoryRequest {
                limit: Some(0),
                offset: None,
            },
        )
        .await?;
    assert_eq!(zero.entries.len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_limit_capped_at_hundred() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for _ in 0..105 {
        fund(&service, alice, "USD", 10).await?;
    }

    let page = service
        .history(
            alice,
            HistoryRequest {
                limit: Some(500),
                offset: None,
            },
        )
        .await?;

    assert_eq!(page.limit, 100);
    assert_eq!(page.entries.len(), 100);
    assert_eq!(page.total, 105);

    Ok(())
}

#[tokio::test]
async fn test_offset_beyond_end_returns_empty_page() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for _ in 0..5 {
        fund(&service, alice, "USD", 100).await?;
    }

    let page = service
        .history(
            alice,
            HistoryRequest {
                limit: Some(10),
                offset: Some(100),
            },
        )
        .await?;

    assert!(page.entries.is_empty());
    assert_eq!(page.total, 5);

    Ok(())
}

#[tokio::test]
async fn test_newest_entry_comes_first() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    fund(&service, alice, "USD", 111).await?;
    fund(&service, alice, "USD", 222).await?;
    let last = service.deposit(alice, deposit("USD", 333)).await?;

    let page = service.history(alice, HistoryRequest::default()).await?;
    assert_eq!(page.entries[0].id, last.id);
    assert_eq!(page.entries[0].amount, 333);

    Ok(())
}

#[tokio::test]
async fn test_history_is_per_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();
    let bob = owner();

    fund(&service, alice, "USD", 100).await?;
    fund(&service, bob, "USD", 200).await?;
    fund(&service, bob, "EUR", 300).await?;

    let page = service.history(bob, HistoryRequest::default()).await?;
    assert_eq!(page.total, 2);
    assert!(page.entries.iter().all(|e| e.owner == bob));

    Ok(())
}

#[tokio::test]
async fn test_repeated_queries_are_deterministic() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = owner();

    for i in 0..12 {
        fund(&service, alice, "USD", 50 + i).await?;
    }

    let req = HistoryRequest {
        limit: Some(5),
        offset: Some(3),
    };
    let first = service.history(alice, req).await?;
    let second = service.history(alice, req).await?;

    let first_ids: Vec<EntryId> = first.entries.iter().map(|e| e.id).collect();
    let second_ids: Vec<EntryId> = second.entries.iter().map(|e| e.id).collect();
    assert_eq!(first_ids, second_ids);

    Ok(())
}
