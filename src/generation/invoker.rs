use async_trait::async_trait;

use crate::{
    error::Result,
    models::{GenerationPlan, InlineImage, InvocationOutcome},
};

/// One request against one model endpoint with one plan.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        images: &[InlineImage],
        plan: &GenerationPlan,
    ) -> Result<InvocationOutcome>;
}
