//! Integration tests for the partner price-list import.
//!
//! These tests require a running `PostgreSQL` database; see the crate docs.

#![allow(clippy::unwrap_used)]

use orderhub_api::db::CatalogRepository;
use orderhub_api::services::import::parse_price_list;
use orderhub_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_import_creates_shop_and_listings() {
    let ctx = TestContext::new().await;
    let shop_user = ctx.create_shop_user().await;

    let (list, listings) = ctx.seed_catalog(&shop_user).await;
    assert_eq!(listings.len(), 2);

    let repo = CatalogRepository::new(&ctx.pool);
    let shop = repo
        .get_shop_by_user(shop_user.id)
        .await
        .expect("shop loads")
        .expect("shop exists");
    assert_eq!(shop.name, list.shop);
    assert!(shop.accepting_orders);

    let views = repo
        .search_listings(Some(shop.id), None)
        .await
        .expect("search succeeds");
    assert_eq!(views.len(), 2);

    let phone = views
        .iter()
        .find(|v| v.product == "Acme Phone X")
        .expect("phone listed");
    assert_eq!(phone.quantity, 10);
    assert_eq!(phone.parameters.len(), 2);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_reimport_replaces_listings() {
    let ctx = TestContext::new().await;
    let shop_user = ctx.create_shop_user().await;
    let (list, _) = ctx.seed_catalog(&shop_user).await;

    // Same shop name, single good with fresh stock.
    let updated_yaml = format!(
        r"
shop: {}
categories:
  - id: 224
    name: Smartphones
goods:
  - id: 1001
    category: 224
    model: acme/phone-x
    name: Acme Phone X
    price: 450
    price_rrc: 499
    quantity: 7
",
        list.shop
    );
    let updated = parse_price_list(&updated_yaml).expect("updated list parses");

    let repo = CatalogRepository::new(&ctx.pool);
    let stats = repo
        .replace_shop_listings(shop_user.id, &updated)
        .await
        .expect("reimport succeeds");
    assert_eq!(stats.products_imported, 1);

    let shop = repo
        .get_shop_by_user(shop_user.id)
        .await
        .expect("shop loads")
        .expect("shop exists");
    let views = repo
        .search_listings(Some(shop.id), None)
        .await
        .expect("search succeeds");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].quantity, 7);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_closed_shop_hidden_from_search() {
    let ctx = TestContext::new().await;
    let shop_user = ctx.create_shop_user().await;
    ctx.seed_catalog(&shop_user).await;

    let repo = CatalogRepository::new(&ctx.pool);
    let shop = repo
        .get_shop_by_user(shop_user.id)
        .await
        .expect("shop loads")
        .expect("shop exists");

    repo.set_accepting_orders(shop_user.id, false)
        .await
        .expect("toggle succeeds");

    let views = repo
        .search_listings(Some(shop.id), None)
        .await
        .expect("search succeeds");
    assert!(views.is_empty());

    let open_shops = repo.list_shops().await.expect("shops list");
    assert!(open_shops.iter().all(|s| s.id != shop.id));

    repo.set_accepting_orders(shop_user.id, true)
        .await
        .expect("toggle succeeds");
    let views = repo
        .search_listings(Some(shop.id), None)
        .await
        .expect("search succeeds");
    assert_eq!(views.len(), 2);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_category_filter() {
    let ctx = TestContext::new().await;
    let shop_user = ctx.create_shop_user().await;
    ctx.seed_catalog(&shop_user).await;

    let repo = CatalogRepository::new(&ctx.pool);
    let shop = repo
        .get_shop_by_user(shop_user.id)
        .await
        .expect("shop loads")
        .expect("shop exists");

    let phones = repo
        .search_listings(Some(shop.id), Some(orderhub_core::CategoryId::new(224)))
        .await
        .expect("search succeeds");
    assert_eq!(phones.len(), 1);
    assert_eq!(phones[0].category, "Smartphones");
}
