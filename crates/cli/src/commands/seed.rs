//! Development seeding command.
//!
//! Creates a buyer and a shop account with fresh auth tokens and prints the
//! tokens, so the API can be exercised immediately after `migrate`.

use orderhub_core::UserType;
use tracing::info;

use orderhub_api::db::UserRepository;

/// Seed demo accounts.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the accounts already
/// exist.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let users = UserRepository::new(&pool);

    let buyer = users
        .create("buyer@example.com", "Demo", "Buyer", UserType::Buyer)
        .await?;
    let buyer_token = users.issue_token(buyer.id).await?;
    info!(user_id = %buyer.id, "created buyer account");

    let shop = users
        .create("shop@example.com", "Demo", "Shop", UserType::Shop)
        .await?;
    let shop_token = users.issue_token(shop.id).await?;
    info!(user_id = %shop.id, "created shop account");

    #[allow(clippy::print_stdout)]
    {
        println!("buyer token: {buyer_token}");
        println!("shop token:  {shop_token}");
        println!("shop user id: {}", shop.id);
    }

    Ok(())
}
