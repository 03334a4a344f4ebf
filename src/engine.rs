use crate::candidate::Candidate;
use crate::error::{ForgeError, GenerationError};
use crate::gateway::CompletionGateway;
use crate::parse::parse_completion;
use crate::prompt::build_prompt;
use crate::rules::{RuleSet, Tier};
use crate::validate::validate_candidates;
use std::sync::Arc;

/// Total attempt budget per generation call (first try plus two retries).
pub const MAX_ATTEMPTS: u32 = 3;

/// One generation call's input. Call-scoped, owned by the engine while it
/// runs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub input: String,
    pub tier: Tier,
    pub conversation: Option<String>,
    pub token_budget_override: Option<u32>,
    pub source_url: Option<String>,
}

impl GenerationRequest {
    pub fn new(input: impl Into<String>, tier: Tier) -> Self {
        Self {
            input: input.into(),
            tier,
            conversation: None,
            token_budget_override: None,
            source_url: None,
        }
    }

    pub fn with_conversation(mut self, conversation: impl Into<String>) -> Self {
        self.conversation = Some(conversation.into());
        self
    }

    pub fn with_token_budget(mut self, budget: u32) -> Self {
        self.token_budget_override = Some(budget);
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Ephemeral per-call bookkeeping: attempt index, accumulated failure
/// reasons, and the last raw completion for diagnostics.
#[derive(Debug, Default)]
struct AttemptState {
    index: u32,
    failures: Vec<String>,
    last_raw: Option<String>,
}

/// Where a finished attempt leaves the call.
#[derive(Debug)]
enum Transition {
    Succeeded(Vec<Candidate>),
    Retry,
    Exhausted,
}

/// Drives the generate → parse → validate loop with an explicit attempt
/// budget. Attempts are strictly sequential; each retry's prompt depends on
/// the previous attempt having failed validation.
pub struct Engine {
    gateway: Box<dyn CompletionGateway>,
    rules: Arc<RuleSet>,
}

impl Engine {
    pub fn new(gateway: Box<dyn CompletionGateway>, rules: Arc<RuleSet>) -> Self {
        Self { gateway, rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Generate exactly the tier's required number of posts from `request`.
    ///
    /// Gateway errors of any kind end the call immediately; only a candidate
    /// set that fails validation triggers another attempt, up to
    /// [`MAX_ATTEMPTS`] in total.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, ForgeError> {
        if request.input.trim().is_empty() {
            return Err(GenerationError::InvalidInput("input text is empty".into()).into());
        }
        if let Some(conversation) = &request.conversation {
            if conversation.trim().is_empty() {
                return Err(
                    GenerationError::InvalidInput("conversation context is empty".into()).into(),
                );
            }
        }

        let required_count = self.rules.tier(request.tier).post_count;
        let mut state = AttemptState::default();

        loop {
            match self.attempt(&request, &mut state, required_count).await? {
                Transition::Succeeded(accepted) => {
                    tracing::info!(
                        tier = request.tier.name(),
                        attempt = state.index,
                        posts = accepted.len(),
                        "generation succeeded"
                    );
                    return Ok(accepted.into_iter().map(|c| c.text).collect());
                }
                Transition::Retry => {
                    state.index += 1;
                }
                Transition::Exhausted => {
                    tracing::warn!(
                        tier = request.tier.name(),
                        attempts = MAX_ATTEMPTS,
                        last_raw = state.last_raw.as_deref().unwrap_or(""),
                        "generation exhausted its attempt budget"
                    );
                    return Err(GenerationError::Exhausted {
                        attempts: MAX_ATTEMPTS,
                        reasons: state.failures,
                    }
                    .into());
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        state: &mut AttemptState,
        required_count: usize,
    ) -> Result<Transition, ForgeError> {
        let mut payload = build_prompt(
            request.tier,
            &self.rules,
            state.index,
            request.conversation.as_deref(),
            &request.input,
        );
        if let Some(budget) = request.token_budget_override {
            payload.token_budget = budget;
        }

        tracing::debug!(
            tier = request.tier.name(),
            attempt = state.index,
            token_budget = payload.token_budget,
            "submitting completion request"
        );

        // Any gateway failure is terminal for the whole call; the `?` below
        // surfaces it as ForgeError::Gateway without spending the budget.
        let completion = self
            .gateway
            .complete(&payload.system, &payload.user, payload.token_budget)
            .await?;

        let candidates: Vec<Candidate> = parse_completion(&completion.text)
            .into_iter()
            .map(Candidate::new)
            .collect();
        state.last_raw = Some(completion.text);

        let outcome = validate_candidates(
            candidates,
            self.rules.tier(request.tier),
            request.source_url.as_deref(),
        );

        if outcome.satisfies(required_count) {
            return Ok(Transition::Succeeded(outcome.accepted));
        }

        let reason = format!(
            "attempt {}: {} of {} candidates accepted ({})",
            state.index + 1,
            outcome.accepted.len(),
            required_count,
            if outcome.rejections.is_empty() {
                "wrong candidate count".to_string()
            } else {
                outcome.rejections.join(", ")
            }
        );
        tracing::warn!(
            tier = request.tier.name(),
            attempt = state.index,
            accepted = outcome.accepted.len(),
            required = required_count,
            "attempt failed validation"
        );
        state.failures.push(reason);

        if state.index + 1 < MAX_ATTEMPTS {
            Ok(Transition::Retry)
        } else {
            Ok(Transition::Exhausted)
        }
    }
}
