use std::sync::Arc;

use super::{
    assembler::{assemble, BatchParams},
    executor::UnitExecutor,
    invoker::ModelInvoker,
    pacing::Pacer,
    seed::SeedAllocator,
};
use crate::{
    config::PacingConfig,
    error::{NanoError, Result},
    logger,
    models::{BatchResult, InlineImage, PromptUnit, UnitResult},
};

/// Everything one batch needs, validated and encoded.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub prompts: Vec<PromptUnit>,
    pub images: Arc<Vec<InlineImage>>,
    pub candidates: Vec<String>,
    pub temperature: f64,
    pub include_prompt: bool,
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    invoker: Arc<dyn ModelInvoker>,
    pacer: Arc<dyn Pacer>,
    pacing: PacingConfig,
}

impl BatchOrchestrator {
    pub fn new(invoker: Arc<dyn ModelInvoker>, pacer: Arc<dyn Pacer>, pacing: PacingConfig) -> Self {
        Self {
            invoker,
            pacer,
            pacing,
        }
    }

    /// Try each candidate in order until one yields at least one image.
    pub async fn run(&self, job: &BatchJob, seeds: &mut SeedAllocator) -> Result<BatchResult> {
        if job.prompts.is_empty() {
            return Err(NanoError::ValidationError("no prompts selected".into()));
        }
        if job.candidates.is_empty() {
            return Err(NanoError::ConfigError("no model candidates configured".into()));
        }

        let batch_id = uuid::Uuid::new_v4().to_string();
        let _timer = logger::timer(&format!("batch {}", batch_id));
        let params = BatchParams {
            temperature: job.temperature,
            seed_mode: seeds.mode(),
            base_seed: seeds.base_seed(),
            include_prompt: job.include_prompt,
        };

        log::info!(
            "🎨 [{}] {} prompt(s), {} reference image(s), candidates: {:?}, seed mode: {}, base seed: {}",
            batch_id,
            job.prompts.len(),
            job.images.len(),
            job.candidates,
            params.seed_mode,
            params.base_seed
        );

        let mut failures: Vec<String> = Vec::with_capacity(job.candidates.len());
        let mut last_attempt: Option<Box<BatchResult>> = None;

        for model in &job.candidates {
            match self.run_candidate(model, job, seeds).await {
                Ok(units) => {
                    let result = assemble(model, units, &job.prompts, &params);
                    if result.ok {
                        log::info!(
                            "✅ [{}] {} produced {}/{} image(s)",
                            batch_id,
                            model,
                            result.image_count(),
                            result.units.len()
                        );
                        return Ok(result);
                    }
                    let failure = format!(
                        "Model returned no images [{}] - {}",
                        model,
                        result.failure_summary()
                    );
                    log::warn!("⚠️  [{}] {}", batch_id, failure);
                    failures.push(failure);
                    last_attempt = Some(Box::new(result));
                }
                Err(e) => {
                    failures.push(format!("[{}] {}", model, e));
                    log::warn!("⚠️  [{}] candidate {} aborted: {}", batch_id, model, e);
                    last_attempt = None;
                }
            }
        }

        log::error!("❌ [{}] no model generated an image", batch_id);
        Err(NanoError::NoModelSucceeded {
            tried: job.candidates.clone(),
            detail: failures.join("; "),
            last_attempt,
        })
    }

    async fn run_candidate(
        &self,
        model: &str,
        job: &BatchJob,
        seeds: &mut SeedAllocator,
    ) -> Result<Vec<UnitResult>> {
        let executor = UnitExecutor::new(
            self.invoker.as_ref(),
            self.pacer.as_ref(),
            self.pacing.plan_pause,
        );
        let mut units = Vec::with_capacity(job.prompts.len());

        for prompt in &job.prompts {
            let seed = seeds.next_seed();
            let unit = executor
                .execute(model, prompt, &job.images, job.temperature, seed)
                .await?;
            units.push(unit);
            self.pacer.pause(self.pacing.unit_pause).await;
        }

        Ok(units)
    }
}
