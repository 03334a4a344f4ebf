use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `tweetforge`.
///
/// Each subsystem defines its own error variant. Callers match on these to
/// pick user-facing messaging (temporary overload vs. persistent generation
/// failure); the binary edge uses `anyhow` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ForgeError {
    // ── Rules document ──────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Completion gateway ──────────────────────────────────────────────
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),

    // ── Generation pipeline ─────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),
}

// ─── Rules document errors ───────────────────────────────────────────────────

/// Fatal at load time: a rejected rules document prevents the engine from
/// starting. Validation is all-or-nothing, never lenient per field.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rules document: {0}")]
    Io(#[from] std::io::Error),

    #[error("rules document is not valid JSON: {0}")]
    Parse(String),

    #[error("invalid rules document: {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("rules path escapes the rules directory: {0}")]
    PathEscape(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ─── Gateway errors ──────────────────────────────────────────────────────────

/// Upstream completion-service failures. None of these are retried by the
/// engine; they terminate the whole generation call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("completion service is overloaded, try again shortly")]
    Overloaded,

    #[error("transport failure calling completion service: {0}")]
    Transport(String),

    #[error("completion service returned an unusable response: {0}")]
    Malformed(String),
}

// ─── Generation errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no valid post set after {attempts} attempts: {}", reasons.join("; "))]
    Exhausted { attempts: u32, reasons: Vec<String> },
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ForgeError>;
