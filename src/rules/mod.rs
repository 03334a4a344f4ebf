pub mod schema;
pub mod store;

pub use schema::{ConversationRules, HashtagPolicy, RuleSet, Tier, TierRules};
pub use store::RuleStore;
