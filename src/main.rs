use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer, Responder, get};

use hrm_leave::config::Config;
use hrm_leave::docs::ApiDoc;
use hrm_leave::routes;
use hrm_leave::state::AppState;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM leave service is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(backend = ?config.store_backend, "Server starting...");

    let state = AppState::from_config(&config).await?;
    let limiter = routes::build_limiter(config.rate_api_per_min)?;
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.scheduler.clone())
            .app_data(state.directory.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiter))
    })
    .bind(&config.server_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
