use std::io;
use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use vault_checkout::config::AppConfig;
use vault_checkout::gateway::{BraintreeSdk, GatewayAdapter};
use vault_checkout::infrastructure::DieselOrderRepository;
use vault_checkout::{build_server, create_pool, run_migrations, AppState, AuthConfig, CheckoutService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let gateway = GatewayAdapter::new(BraintreeSdk::new(config.braintree.clone()));
    let checkout = CheckoutService::new(
        Arc::new(DieselOrderRepository::new(pool)),
        Arc::new(gateway),
    );

    let state = AppState {
        checkout: web::Data::new(checkout),
        auth: web::Data::new(AuthConfig::new(config.jwt_secret.clone())),
        client_token_requires_auth: config.client_token_requires_auth,
    };

    log::info!(
        "Starting server at http://{}:{} (braintree {:?})",
        config.host,
        config.port,
        config.braintree.environment
    );

    build_server(state, &config.host, config.port)?.await
}
