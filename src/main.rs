use nanogen::{
    logger,
    server::{self, AppState},
    Config, GeminiClient, PromptCatalog,
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init()?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    let catalog = PromptCatalog::load(config.catalog_path.as_deref())?;

    let invoker = match GeminiClient::new(&config.gemini) {
        Ok(client) => Some(client.invoker()),
        Err(e) => {
            log::error!("❌ {}; batch submissions will be rejected until it is set", e);
            None
        }
    };

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.bind_address(),
    );
    logger::log_config_info(&config, catalog.len());

    server::run(AppState::new(config, catalog, invoker)).await?;

    log::info!("👋 Server stopped");
    Ok(())
}
