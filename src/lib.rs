pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::error::Error;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpResponse, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use application::checkout_service::CheckoutService;
pub use auth::AuthConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payment::braintree_token,
        handlers::payment::braintree_payment,
        handlers::orders::buyer_orders,
    ),
    components(schemas(
        handlers::payment::PaymentRequest,
        handlers::payment::PaymentResponse,
        handlers::orders::OrderResponse,
        domain::order::OrderStatus,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "payment", description = "Client token issuance and checkout"),
        (name = "orders", description = "Buyer order history"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Shared, read-only state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub checkout: web::Data<CheckoutService>,
    pub auth: web::Data<AuthConfig>,
    pub client_token_requires_auth: bool,
}

/// Register the HTTP surface. Expects `CheckoutService` and `AuthConfig` to
/// be present as app data.
pub fn routes(cfg: &mut web::ServiceConfig, client_token_requires_auth: bool) {
    use handlers::{orders, payment};

    let product = web::scope("/api/v1/product");
    let product = if client_token_requires_auth {
        product.service(
            web::resource("/braintree/token")
                .wrap(from_fn(auth::require_sign_in))
                .route(web::get().to(payment::braintree_token)),
        )
    } else {
        product.route("/braintree/token", web::get().to(payment::braintree_token))
    };
    let product = product.service(
        web::resource("/braintree/payment")
            .app_data(payment::payment_json_config())
            .wrap(from_fn(auth::require_sign_in))
            .route(web::post().to(payment::braintree_payment)),
    );

    cfg.route(
        "/health",
        web::get().to(|| async { HttpResponse::Ok().json(json!({ "status": "ok" })) }),
    )
    .service(product)
    .service(
        web::scope("/api/v1/auth")
            .wrap(from_fn(auth::require_sign_in))
            .route("/orders", web::get().to(orders::buyer_orders)),
    )
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.checkout.clone())
            .app_data(state.auth.clone())
            .wrap(Logger::default())
            .configure(|cfg| routes(cfg, state.client_token_requires_auth))
    })
    .bind((host.to_string(), port))?
    .run())
}
