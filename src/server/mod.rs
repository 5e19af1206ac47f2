pub mod handlers;
pub mod request;
pub mod response;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    catalog::PromptCatalog,
    config::Config,
    generation::{ModelInvoker, Pacer, TokioPacer},
};

/// Read-only state shared by every request. Nothing in here is mutated after startup.
pub struct AppState {
    pub config: Config,
    pub catalog: PromptCatalog,
    /// `None` when no API key is configured; batch submissions then fail with a config error.
    pub invoker: Option<Arc<dyn ModelInvoker>>,
    pub pacer: Arc<dyn Pacer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: PromptCatalog,
        invoker: Option<Arc<dyn ModelInvoker>>,
    ) -> Self {
        Self {
            config,
            catalog,
            invoker,
            pacer: Arc::new(TokioPacer),
            started_at: Instant::now(),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/nano")
            .route(web::get().to(handlers::list_prompts))
            .route(web::post().to(handlers::generate)),
    )
    .route("/api/health", web::get().to(handlers::health));
}

pub async fn run(state: AppState) -> std::io::Result<()> {
    let bind_address = state.config.bind_address();
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
