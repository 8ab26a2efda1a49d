//! Integration tests for order placement, cancellation, and contact update.
//!
//! These tests require a running `PostgreSQL` database; see the crate docs.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use orderhub_api::db::baskets::LineItemInput;
use orderhub_api::db::{
    BasketRepository, ContactRepository, OrderError, OrderRepository, RepositoryError,
};
use orderhub_api::models::{Contact, User};
use orderhub_core::{ContactId, ListingId, OrderState};
use orderhub_integration_tests::TestContext;

/// Seed a buyer with a two-line basket (2 phones, 1 case) and a contact.
async fn buyer_with_basket(ctx: &TestContext) -> (User, Contact, Vec<ListingId>) {
    let buyer = ctx.create_buyer().await;
    let shop = ctx.create_shop_user().await;
    let (_, listings) = ctx.seed_catalog(&shop).await;

    BasketRepository::new(&ctx.pool)
        .add_items(
            buyer.id,
            &[
                LineItemInput {
                    listing_id: listings[0],
                    quantity: 2,
                },
                LineItemInput {
                    listing_id: listings[1],
                    quantity: 1,
                },
            ],
        )
        .await
        .expect("basket fills");

    let contact = ContactRepository::new(&ctx.pool)
        .create(buyer.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");

    (buyer, contact, listings)
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_decrements_stock_and_computes_total() {
    let ctx = TestContext::new().await;
    let (buyer, contact, listings) = buyer_with_basket(&ctx).await;

    let placed = OrderRepository::new(&ctx.pool)
        .place(buyer.id, None, contact.id)
        .await
        .expect("placement succeeds");

    // 2 * 500 + 1 * 19.99
    assert_eq!(placed.total, "1019.99".parse::<Decimal>().unwrap());
    assert_eq!(ctx.stock(listings[0]).await, 8);
    assert_eq!(ctx.stock(listings[1]).await, 2);

    let orders = OrderRepository::new(&ctx.pool)
        .list(buyer.id)
        .await
        .expect("orders list");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].state, OrderState::New);
    assert_eq!(orders[0].items.len(), 2);
    assert_eq!(
        orders[0].contact.as_ref().map(|c| c.id),
        Some(contact.id)
    );

    // The placed basket is gone; a fresh one starts empty.
    let basket = BasketRepository::new(&ctx.pool)
        .get_basket(buyer.id)
        .await
        .expect("basket loads");
    assert!(basket.items.is_empty());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_shortage_rolls_back_and_lists_offenders() {
    let ctx = TestContext::new().await;
    let (buyer, contact, listings) = buyer_with_basket(&ctx).await;

    // Stock drains between basket fill and placement.
    sqlx::query("UPDATE listings SET quantity = 1 WHERE id = $1")
        .bind(listings[0])
        .execute(&ctx.pool)
        .await
        .expect("stock shrinks");
    sqlx::query("UPDATE listings SET quantity = 0 WHERE id = $1")
        .bind(listings[1])
        .execute(&ctx.pool)
        .await
        .expect("stock shrinks");

    let result = OrderRepository::new(&ctx.pool)
        .place(buyer.id, None, contact.id)
        .await;

    match result {
        Err(OrderError::InsufficientStock(shortages)) => {
            assert_eq!(shortages.len(), 2);
        }
        other => panic!("expected shortage, got {other:?}"),
    }

    // Nothing was decremented and the basket survived.
    assert_eq!(ctx.stock(listings[0]).await, 1);
    assert_eq!(ctx.stock(listings[1]).await, 0);
    let basket = BasketRepository::new(&ctx.pool)
        .get_basket(buyer.id)
        .await
        .expect("basket loads");
    assert_eq!(basket.items.len(), 2);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_empty_basket_fails() {
    let ctx = TestContext::new().await;
    let buyer = ctx.create_buyer().await;
    let contact = ContactRepository::new(&ctx.pool)
        .create(buyer.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");

    let result = OrderRepository::new(&ctx.pool)
        .place(buyer.id, None, contact.id)
        .await;
    assert!(matches!(result, Err(OrderError::EmptyBasket)));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_reports_empty_basket_before_missing_contact() {
    let ctx = TestContext::new().await;
    let buyer = ctx.create_buyer().await;
    let basket = BasketRepository::new(&ctx.pool)
        .find_or_create(buyer.id)
        .await
        .expect("basket creates");

    // An empty basket with a bogus contact fails on the basket, not the
    // contact.
    let result = OrderRepository::new(&ctx.pool)
        .place(buyer.id, Some(basket.id), ContactId::new(999_999))
        .await;
    assert!(matches!(result, Err(OrderError::EmptyBasket)));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_place_rejects_foreign_contact() {
    let ctx = TestContext::new().await;
    let (buyer, _, _) = buyer_with_basket(&ctx).await;

    let stranger = ctx.create_buyer().await;
    let foreign_contact = ContactRepository::new(&ctx.pool)
        .create(stranger.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");

    let result = OrderRepository::new(&ctx.pool)
        .place(buyer.id, None, foreign_contact.id)
        .await;
    assert!(matches!(result, Err(OrderError::ContactNotFound)));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_concurrent_placements_never_oversell() {
    let ctx = TestContext::new().await;
    let shop = ctx.create_shop_user().await;
    let (_, listings) = ctx.seed_catalog(&shop).await;

    let baskets = BasketRepository::new(&ctx.pool);
    let contacts = ContactRepository::new(&ctx.pool);

    // The case listing has 3 in stock; two baskets of 2 cannot both fit.
    let first = ctx.create_buyer().await;
    let second = ctx.create_buyer().await;
    for buyer in [&first, &second] {
        baskets
            .add_items(
                buyer.id,
                &[LineItemInput {
                    listing_id: listings[1],
                    quantity: 2,
                }],
            )
            .await
            .expect("basket fills");
    }
    let first_contact = contacts
        .create(first.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");
    let second_contact = contacts
        .create(second.id, "Riga", "Brivibas", "2", "", "+371 20000001")
        .await
        .expect("contact creates");

    let repo = OrderRepository::new(&ctx.pool);
    let (a, b) = tokio::join!(
        repo.place(first.id, None, first_contact.id),
        repo.place(second.id, None, second_contact.id),
    );

    // Exactly one placement wins; the loser sees the shortage.
    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "one of the two placements must succeed: {a:?} {b:?}"
    );
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, OrderError::InsufficientStock(_)), "{e:?}");
        }
    }
    assert_eq!(ctx.stock(listings[1]).await, 1);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_cancel_restores_stock() {
    let ctx = TestContext::new().await;
    let (buyer, contact, listings) = buyer_with_basket(&ctx).await;

    let repo = OrderRepository::new(&ctx.pool);
    let placed = repo
        .place(buyer.id, None, contact.id)
        .await
        .expect("placement succeeds");
    assert_eq!(ctx.stock(listings[0]).await, 8);

    repo.cancel(buyer.id, placed.id).await.expect("cancel succeeds");

    assert_eq!(ctx.stock(listings[0]).await, 10);
    assert_eq!(ctx.stock(listings[1]).await, 3);

    let state = repo
        .get_state(buyer.id, placed.id)
        .await
        .expect("state loads");
    assert_eq!(state, Some(OrderState::Canceled));

    // A canceled order cannot be canceled again.
    let result = repo.cancel(buyer.id, placed.id).await;
    assert!(matches!(
        result,
        Err(OrderError::Repository(RepositoryError::NotFound))
    ));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_contact_only_while_new() {
    let ctx = TestContext::new().await;
    let (buyer, contact, _) = buyer_with_basket(&ctx).await;

    let repo = OrderRepository::new(&ctx.pool);
    let placed = repo
        .place(buyer.id, None, contact.id)
        .await
        .expect("placement succeeds");

    let other_contact = ContactRepository::new(&ctx.pool)
        .create(buyer.id, "Daugavpils", "Rigas", "5", "12", "+371 21111111")
        .await
        .expect("contact creates");

    repo.update_contact(buyer.id, placed.id, other_contact.id)
        .await
        .expect("contact update succeeds");

    repo.cancel(buyer.id, placed.id).await.expect("cancel succeeds");

    let result = repo
        .update_contact(buyer.id, placed.id, contact.id)
        .await;
    assert!(matches!(
        result,
        Err(OrderError::Repository(RepositoryError::NotFound))
    ));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_contact_rejects_foreign_contact() {
    let ctx = TestContext::new().await;
    let (buyer, contact, _) = buyer_with_basket(&ctx).await;

    let repo = OrderRepository::new(&ctx.pool);
    let placed = repo
        .place(buyer.id, None, contact.id)
        .await
        .expect("placement succeeds");

    let stranger = ctx.create_buyer().await;
    let foreign_contact = ContactRepository::new(&ctx.pool)
        .create(stranger.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");

    // Another user's contact reads as missing here.
    let result = repo
        .update_contact(buyer.id, placed.id, foreign_contact.id)
        .await;
    assert!(matches!(
        result,
        Err(OrderError::Repository(RepositoryError::NotFound))
    ));

    let orders = repo.list(buyer.id).await.expect("orders list");
    assert_eq!(
        orders[0].contact.as_ref().map(|c| c.id),
        Some(contact.id)
    );
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_partner_sees_orders_with_their_listings() {
    let ctx = TestContext::new().await;
    let buyer = ctx.create_buyer().await;
    let shop = ctx.create_shop_user().await;
    let (_, listings) = ctx.seed_catalog(&shop).await;

    BasketRepository::new(&ctx.pool)
        .add_items(
            buyer.id,
            &[LineItemInput {
                listing_id: listings[0],
                quantity: 1,
            }],
        )
        .await
        .expect("basket fills");
    let contact = ContactRepository::new(&ctx.pool)
        .create(buyer.id, "Riga", "Brivibas", "1", "", "+371 20000000")
        .await
        .expect("contact creates");

    let placed = OrderRepository::new(&ctx.pool)
        .place(buyer.id, None, contact.id)
        .await
        .expect("placement succeeds");

    let partner_orders = OrderRepository::new(&ctx.pool)
        .list_for_partner(shop.id)
        .await
        .expect("partner orders list");
    assert!(partner_orders.iter().any(|o| o.id == placed.id));

    // An unrelated shop sees nothing.
    let other_shop = ctx.create_shop_user().await;
    let none = OrderRepository::new(&ctx.pool)
        .list_for_partner(other_shop.id)
        .await
        .expect("partner orders list");
    assert!(none.iter().all(|o| o.id != placed.id));
}
