#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::return_self_not_must_use
)]

pub mod candidate;
pub mod cli;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod parse;
pub mod prompt;
pub mod rules;
pub mod validate;

pub use candidate::Candidate;
pub use engine::{Engine, GenerationRequest, MAX_ATTEMPTS};
pub use error::{ConfigError, ForgeError, GatewayError, GenerationError};
pub use gateway::{AnthropicGateway, CompletionGateway, RawCompletion};
pub use rules::{RuleSet, RuleStore, Tier};
