pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use application::Storefront;
use auth::JwtKeys;
use errors::AppError;
use infrastructure::DieselStorefrontRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The storefront wired to Postgres, shared by every worker.
pub type AppStorefront = Storefront<DieselStorefrontRepository>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::checkout::checkout,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::order_stats,
        handlers::cart::view_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_item,
        handlers::cart::remove_cart_item,
        handlers::cart::clear_cart,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "checkout", description = "Turn a cart into an order"),
        (name = "orders", description = "Order history and administration"),
        (name = "cart", description = "Shopping cart"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

/// Register the storefront routes.
///
/// Literal segments (`/orders/stats`, `/cart/clear`) are registered ahead of
/// the `{id}` resources that would otherwise capture them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/checkout", web::post().to(handlers::checkout::checkout))
        .service(
            web::scope("/orders")
                .route("", web::get().to(handlers::orders::list_orders))
                .route("/stats", web::get().to(handlers::orders::order_stats))
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(handlers::orders::get_order))
                        .route(web::patch().to(handlers::orders::update_order_status)),
                ),
        )
        .service(
            web::scope("/cart")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::cart::view_cart))
                        .route(web::post().to(handlers::cart::add_to_cart)),
                )
                .route("/clear", web::delete().to(handlers::cart::clear_cart))
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(handlers::cart::update_cart_item))
                        .route(web::delete().to(handlers::cart::remove_cart_item)),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    jwt_keys: JwtKeys,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let storefront = web::Data::new(AppStorefront::new(DieselStorefrontRepository::new(pool)));
    let jwt_keys = web::Data::new(jwt_keys);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(storefront.clone())
            .app_data(jwt_keys.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
