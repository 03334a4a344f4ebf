mod builder;

pub use builder::{build_prompt, PromptPayload};
