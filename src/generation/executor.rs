use std::time::Duration;

use super::{invoker::ModelInvoker, pacing::Pacer, plan::plans_for};
use crate::{
    error::{NanoError, Result},
    models::{extension_for, InlineImage, PromptUnit, UnitResult},
};

pub const FALLBACK_MIME: &str = "image/png";

/// Lifecycle of one (prompt, model) unit walking the plan ladder.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitState {
    Pending,
    Trying(usize),
    Advancing(usize),
    Succeeded { plan: usize, image: InlineImage },
    Exhausted { plan: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvent {
    Start,
    Produced(InlineImage),
    Failed,
    Paced,
}

impl UnitState {
    /// Pure transition function. Events that make no sense in a state leave it unchanged.
    pub fn on(self, event: UnitEvent, plan_count: usize) -> UnitState {
        match (self, event) {
            (UnitState::Pending, UnitEvent::Start) if plan_count == 0 => {
                UnitState::Exhausted { plan: 0 }
            }
            (UnitState::Pending, UnitEvent::Start) => UnitState::Trying(0),
            (UnitState::Trying(i), UnitEvent::Produced(image)) => {
                UnitState::Succeeded { plan: i, image }
            }
            (UnitState::Trying(i), UnitEvent::Failed) => UnitState::Advancing(i),
            (UnitState::Advancing(i), UnitEvent::Paced) if i + 1 < plan_count => {
                UnitState::Trying(i + 1)
            }
            (UnitState::Advancing(i), UnitEvent::Paced) => UnitState::Exhausted { plan: i },
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitState::Succeeded { .. } | UnitState::Exhausted { .. }
        )
    }
}

/// Drives one unit through the plan ladder against a single model.
pub struct UnitExecutor<'a> {
    invoker: &'a dyn ModelInvoker,
    pacer: &'a dyn Pacer,
    plan_pause: Duration,
}

impl<'a> UnitExecutor<'a> {
    pub fn new(invoker: &'a dyn ModelInvoker, pacer: &'a dyn Pacer, plan_pause: Duration) -> Self {
        Self {
            invoker,
            pacer,
            plan_pause,
        }
    }

    /// Never fails for plan-level problems; those end up in `UnitResult::error`.
    /// Only errors that condemn the whole model (see [`NanoError::is_recoverable`]) escape.
    pub async fn execute(
        &self,
        model: &str,
        prompt: &PromptUnit,
        images: &[InlineImage],
        temperature: f64,
        seed: u32,
    ) -> Result<UnitResult> {
        let plans = plans_for(temperature, seed);
        let mut state = UnitState::Pending;
        let mut last_error: Option<NanoError> = None;
        let mut attempts = 0;

        while !state.is_terminal() {
            let event = match &state {
                UnitState::Pending => UnitEvent::Start,
                UnitState::Trying(i) => {
                    let plan = &plans[*i];
                    attempts += 1;
                    log::debug!(
                        "🧪 [{}] {} plan {}/{} (seed: {:?}, modalities: {:?})",
                        model,
                        prompt.name,
                        i + 1,
                        plans.len(),
                        plan.seed,
                        plan.modalities
                    );

                    let attempt = self
                        .invoker
                        .invoke(model, &prompt.text, images, plan)
                        .await
                        .and_then(|outcome| outcome.into_image());

                    match attempt {
                        Ok(image) => UnitEvent::Produced(image),
                        Err(e) if e.is_recoverable() => {
                            log::debug!("[{}] {} plan {} failed: {}", model, prompt.name, i + 1, e);
                            last_error = Some(e);
                            UnitEvent::Failed
                        }
                        Err(e) => return Err(e),
                    }
                }
                UnitState::Advancing(_) => {
                    self.pacer.pause(self.plan_pause).await;
                    UnitEvent::Paced
                }
                UnitState::Succeeded { .. } | UnitState::Exhausted { .. } => break,
            };
            state = state.on(event, plans.len());
        }

        match state {
            UnitState::Succeeded { plan, image } => {
                let seed_used = plans[plan].seed;
                Ok(UnitResult {
                    name: prompt.name.clone(),
                    suggested_filename: suggested_filename(
                        &prompt.name,
                        seed_used,
                        &image.mime_type,
                    ),
                    image_base64: Some(image.data),
                    mime_type: image.mime_type,
                    seed_used,
                    requested_seed: seed,
                    attempts,
                    prompt_text: None,
                    error: None,
                })
            }
            UnitState::Exhausted { plan } => {
                let seed_used = plans.get(plan).and_then(|p| p.seed).or(Some(seed));
                let error = last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no image".to_string());
                log::warn!("[{}] {} exhausted all plans: {}", model, prompt.name, error);
                Ok(UnitResult {
                    name: prompt.name.clone(),
                    image_base64: None,
                    mime_type: FALLBACK_MIME.to_string(),
                    seed_used,
                    requested_seed: seed,
                    suggested_filename: suggested_filename(&prompt.name, seed_used, FALLBACK_MIME),
                    attempts,
                    prompt_text: None,
                    error: Some(error),
                })
            }
            other => Err(NanoError::InternalError(format!(
                "unit {} stopped in non-terminal state {:?}",
                prompt.name, other
            ))),
        }
    }
}

/// `{name}_seed_{seed}.{ext}`, or `{name}_noseed.{ext}` when no seed was sent.
pub fn suggested_filename(name: &str, seed: Option<u32>, mime_type: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect();
    let ext = extension_for(mime_type);
    match seed {
        Some(seed) => format!("{}_seed_{}.{}", safe, seed, ext),
        None => format!("{}_noseed.{}", safe, ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::pacing::RecordingPacer;
    use crate::models::{GenerationPlan, InvocationOutcome};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers each call from a script; records the plans it saw.
    struct ScriptedInvoker {
        script: Mutex<Vec<Result<InvocationOutcome>>>,
        seen: Mutex<Vec<GenerationPlan>>,
    }

    impl ScriptedInvoker {
        fn new(mut script: Vec<Result<InvocationOutcome>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<GenerationPlan> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn invoke(
            &self,
            _model: &str,
            _prompt: &str,
            _images: &[InlineImage],
            plan: &GenerationPlan,
        ) -> Result<InvocationOutcome> {
            self.seen.lock().unwrap().push(plan.clone());
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(InvocationOutcome::default()))
        }
    }

    fn png(data: &str) -> InvocationOutcome {
        InvocationOutcome::with_image(InlineImage::new("image/png", data))
    }

    #[test]
    fn transitions_follow_the_ladder() {
        let s = UnitState::Pending.on(UnitEvent::Start, 3);
        assert_eq!(s, UnitState::Trying(0));
        let s = s.on(UnitEvent::Failed, 3);
        assert_eq!(s, UnitState::Advancing(0));
        let s = s.on(UnitEvent::Paced, 3);
        assert_eq!(s, UnitState::Trying(1));
        let s = s.on(UnitEvent::Failed, 3).on(UnitEvent::Paced, 3);
        assert_eq!(s, UnitState::Trying(2));
        let s = s.on(UnitEvent::Failed, 3).on(UnitEvent::Paced, 3);
        assert_eq!(s, UnitState::Exhausted { plan: 2 });
        assert!(s.is_terminal());
    }

    #[test]
    fn success_is_terminal_and_ignores_further_events() {
        let image = InlineImage::new("image/png", "abc");
        let s = UnitState::Trying(1).on(UnitEvent::Produced(image.clone()), 3);
        assert_eq!(s, UnitState::Succeeded { plan: 1, image: image.clone() });
        assert_eq!(s.clone().on(UnitEvent::Failed, 3), s);
    }

    #[tokio::test]
    async fn first_plan_success_stops_the_ladder() {
        let invoker = ScriptedInvoker::new(vec![Ok(png("img"))]);
        let pacer = RecordingPacer::new();
        let exec = UnitExecutor::new(&invoker, &pacer, Duration::from_millis(120));

        let unit = exec
            .execute("m", &PromptUnit::new("night_view", "night"), &[], 1.0, 42)
            .await
            .unwrap();

        assert_eq!(unit.image_base64.as_deref(), Some("img"));
        assert_eq!(unit.seed_used, Some(42));
        assert_eq!(unit.attempts, 1);
        assert_eq!(unit.suggested_filename, "night_view_seed_42.png");
        assert_eq!(invoker.seen().len(), 1);
        assert!(pacer.pauses().is_empty());
    }

    #[tokio::test]
    async fn third_plan_success_reports_no_seed() {
        let invoker = ScriptedInvoker::new(vec![
            Err(NanoError::InvocationError("seed rejected".into())),
            Ok(InvocationOutcome::text_only("I can only describe it")),
            Ok(png("late")),
        ]);
        let pacer = RecordingPacer::new();
        let exec = UnitExecutor::new(&invoker, &pacer, Duration::from_millis(120));

        let unit = exec
            .execute("m", &PromptUnit::new("watercolor", "paint"), &[], 0.5, 9)
            .await
            .unwrap();

        let seen = invoker.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].seed, Some(9));
        assert_eq!(seen[1].modalities, vec![crate::models::Modality::Image]);
        assert_eq!(seen[2].seed, None);

        assert!(unit.has_image());
        assert_eq!(unit.seed_used, None);
        assert_eq!(unit.requested_seed, 9);
        assert_eq!(unit.suggested_filename, "watercolor_noseed.png");
        assert_eq!(pacer.pauses(), vec![Duration::from_millis(120); 2]);
    }

    #[tokio::test]
    async fn exhaustion_prefers_model_text_in_the_error() {
        let invoker = ScriptedInvoker::new(vec![
            Err(NanoError::InvocationError("503".into())),
            Err(NanoError::InvocationError("503".into())),
            Ok(InvocationOutcome::text_only("I cannot generate that")),
        ]);
        let pacer = RecordingPacer::new();
        let exec = UnitExecutor::new(&invoker, &pacer, Duration::ZERO);

        let unit = exec
            .execute("m", &PromptUnit::new("sketch", "draw"), &[], 1.0, 5)
            .await
            .unwrap();

        assert!(!unit.has_image());
        assert_eq!(unit.attempts, 3);
        assert_eq!(unit.seed_used, Some(5));
        assert_eq!(
            unit.error.as_deref(),
            Some("no image in response - model said: I cannot generate that")
        );
        assert_eq!(pacer.pauses().len(), 3);
    }

    #[tokio::test]
    async fn unavailable_model_escapes_the_unit() {
        let invoker = ScriptedInvoker::new(vec![Err(NanoError::ModelUnavailable("404".into()))]);
        let pacer = RecordingPacer::new();
        let exec = UnitExecutor::new(&invoker, &pacer, Duration::ZERO);

        let err = exec
            .execute("m", &PromptUnit::new("a", "b"), &[], 1.0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, NanoError::ModelUnavailable(_)));
        assert_eq!(invoker.seen().len(), 1);
    }

    #[test]
    fn filenames_are_path_safe() {
        assert_eq!(
            suggested_filename("a/b c", Some(3), "image/jpeg"),
            "a_b_c_seed_3.jpg"
        );
        assert_eq!(suggested_filename("sketch_b&w", None, "image/png"), "sketch_b&w_noseed.png");
    }
}
