use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

use super::{
    request::{BatchForm, BatchQuery},
    AppState,
};
use crate::{
    error::{NanoError, Result},
    generation::{codec, BatchJob, BatchOrchestrator, SeedAllocator},
};

/// `GET /api/nano`
pub async fn list_prompts(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "ok": true,
        "prompts": state.catalog.prompts(),
    }))
}

/// `POST /api/nano`
pub async fn generate(
    state: web::Data<AppState>,
    query: web::Query<BatchQuery>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let invoker = state
        .invoker
        .clone()
        .ok_or_else(|| NanoError::ConfigError("Missing GEMINI_API_KEY".into()))?;

    let options = query.resolve(
        &state.config.model_candidates,
        state.config.default_jpeg_quality,
    );
    let form = BatchForm::read(payload, state.config.max_upload_bytes).await?;
    let prompts = form.resolve_prompts(&state.catalog)?;

    if form.images.is_empty() {
        return Err(NanoError::ValidationError(
            "Please upload at least one image".into(),
        ));
    }

    let quality = options.jpeg_quality;
    let uploads = form.images;
    let images = web::block(move || codec::encode_all(&uploads, quality))
        .await
        .map_err(|e| NanoError::InternalError(format!("image encoding task failed: {}", e)))??;

    let job = BatchJob {
        prompts,
        images: Arc::new(images),
        candidates: options.candidates,
        temperature: options.temperature,
        include_prompt: options.include_prompt,
    };
    let mut seeds = SeedAllocator::new(options.seed_mode, options.seed);

    let orchestrator = BatchOrchestrator::new(invoker, state.pacer.clone(), state.config.pacing);
    let result = orchestrator.run(&job, &mut seeds).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "ok": true,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "geminiConfigured": state.invoker.is_some(),
    }))
}
