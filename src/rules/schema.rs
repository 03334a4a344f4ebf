use crate::error::ConfigError;
use serde_json::Value;

/// Caller category. Each tier carries its own generation constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Guest,
    Authenticated,
}

impl Tier {
    /// How many posts a valid result must contain for this tier, unless the
    /// rules document overrides it.
    pub fn default_post_count(self) -> usize {
        match self {
            Self::Guest => 3,
            Self::Authenticated => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Authenticated => "authenticated",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HashtagPolicy {
    pub allowed: bool,
    pub max_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct TierRules {
    pub base_prompt_template: String,
    pub max_chars: u32,
    pub hashtag_policy: HashtagPolicy,
    pub token_budget: u32,
    pub examples: Vec<String>,
    pub post_count: usize,
}

#[derive(Debug, Clone)]
pub struct ConversationRules {
    pub context_instruction: String,
    pub token_budget: u32,
}

/// Versioned, immutable generation constraints. Loaded once per process and
/// shared read-only across concurrent generation calls.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub version: String,
    pub guest: TierRules,
    pub authenticated: TierRules,
    pub conversation: ConversationRules,
}

impl RuleSet {
    pub fn tier(&self, tier: Tier) -> &TierRules {
        match tier {
            Tier::Guest => &self.guest,
            Tier::Authenticated => &self.authenticated,
        }
    }

    /// Parse and validate a rules document. All-or-nothing: any missing or
    /// mistyped field rejects the whole document. Fields are checked in a
    /// fixed order so a given defect always produces the same error.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let root: Value =
            serde_json::from_str(doc).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let version = require_str(&root, "version")?;
        if !is_major_minor(version) {
            return Err(ConfigError::invalid(
                "version",
                format!("expected \"major.minor\", got {version:?}"),
            ));
        }

        let guest = validate_tier(&root, Tier::Guest)?;
        let authenticated = validate_tier(&root, Tier::Authenticated)?;
        let conversation = validate_conversation(&root)?;

        Ok(Self {
            version: version.to_string(),
            guest,
            authenticated,
            conversation,
        })
    }
}

/// `^\d+\.\d+$` without a regex dependency.
fn is_major_minor(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn field_missing(field: &str) -> ConfigError {
    ConfigError::invalid(field, "required field is missing")
}

fn get<'a>(root: &'a Value, field: &str) -> Result<&'a Value, ConfigError> {
    let mut current = root;
    for segment in field.split('.') {
        current = current.get(segment).ok_or_else(|| field_missing(field))?;
    }
    Ok(current)
}

fn require_str<'a>(root: &'a Value, field: &str) -> Result<&'a str, ConfigError> {
    get(root, field)?
        .as_str()
        .ok_or_else(|| ConfigError::invalid(field, "must be a string"))
}

fn require_positive_u32(root: &Value, field: &str) -> Result<u32, ConfigError> {
    let value = get(root, field)?
        .as_i64()
        .ok_or_else(|| ConfigError::invalid(field, "must be an integer"))?;
    if value <= 0 {
        return Err(ConfigError::invalid(field, "must be positive"));
    }
    u32::try_from(value).map_err(|_| ConfigError::invalid(field, "out of range"))
}

fn require_bool(root: &Value, field: &str) -> Result<bool, ConfigError> {
    get(root, field)?
        .as_bool()
        .ok_or_else(|| ConfigError::invalid(field, "must be a boolean"))
}

fn validate_tier(root: &Value, tier: Tier) -> Result<TierRules, ConfigError> {
    let prefix = tier.name();

    let template = require_str(root, &format!("{prefix}.base_prompt_template"))?;
    if !template.contains("${count}") {
        return Err(ConfigError::invalid(
            format!("{prefix}.base_prompt_template"),
            "must contain the ${count} placeholder",
        ));
    }

    let max_chars = require_positive_u32(root, &format!("{prefix}.max_chars"))?;

    let allowed = require_bool(root, &format!("{prefix}.hashtag_policy.allowed"))?;
    let max_count_field = format!("{prefix}.hashtag_policy.max_count");
    let max_count = match get(root, &max_count_field) {
        Err(_) => None,
        Ok(value) => {
            let n = value
                .as_i64()
                .ok_or_else(|| ConfigError::invalid(max_count_field.as_str(), "must be an integer"))?;
            if n < 0 {
                return Err(ConfigError::invalid(max_count_field.as_str(), "must not be negative"));
            }
            Some(
                u32::try_from(n)
                    .map_err(|_| ConfigError::invalid(max_count_field.as_str(), "out of range"))?,
            )
        }
    };

    let token_budget = require_positive_u32(root, &format!("{prefix}.token_budget"))?;

    // examples are optional but must be an array of strings when present
    let examples_field = format!("{prefix}.examples");
    let examples = match get(root, &examples_field) {
        Err(_) => Vec::new(),
        Ok(value) => {
            let items = value
                .as_array()
                .ok_or_else(|| ConfigError::invalid(examples_field.as_str(), "must be an array"))?;
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::invalid(examples_field.as_str(), "entries must be strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let post_count_field = format!("{prefix}.post_count");
    let post_count = match get(root, &post_count_field) {
        Err(_) => tier.default_post_count(),
        Ok(_) => require_positive_u32(root, &post_count_field)? as usize,
    };

    Ok(TierRules {
        base_prompt_template: template.to_string(),
        max_chars,
        hashtag_policy: HashtagPolicy { allowed, max_count },
        token_budget,
        examples,
        post_count,
    })
}

fn validate_conversation(root: &Value) -> Result<ConversationRules, ConfigError> {
    let context_instruction = require_str(root, "conversation.context_instruction")?.to_string();
    let token_budget = require_positive_u32(root, "conversation.token_budget")?;
    Ok(ConversationRules {
        context_instruction,
        token_budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::store::DEFAULT_RULES_JSON;

    fn doc() -> serde_json::Value {
        serde_json::from_str(DEFAULT_RULES_JSON).unwrap()
    }

    #[test]
    fn bundled_document_is_valid() {
        let rules = RuleSet::from_json(DEFAULT_RULES_JSON).unwrap();
        assert_eq!(rules.version, "1.2");
        assert_eq!(rules.tier(Tier::Guest).post_count, 3);
        assert_eq!(rules.tier(Tier::Authenticated).post_count, 4);
        assert!(!rules.guest.hashtag_policy.allowed);
        assert_eq!(rules.authenticated.hashtag_policy.max_count, Some(2));
        assert_eq!(rules.conversation.token_budget, 1200);
    }

    #[test]
    fn rejects_bad_version_strings() {
        for bad in ["1", "1.2.3", "v1.2", "1.", ".2", "one.two"] {
            let mut root = doc();
            root["version"] = serde_json::json!(bad);
            let err = RuleSet::from_json(&root.to_string()).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { field, .. } if field == "version"),
                "version {bad:?} should be rejected, got: {err}"
            );
        }
    }

    #[test]
    fn missing_token_budget_fails_instead_of_defaulting() {
        let mut root = doc();
        root["guest"].as_object_mut().unwrap().remove("token_budget");
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, message }
                if field == "guest.token_budget" && message.contains("missing"))
        );
    }

    #[test]
    fn zero_max_chars_rejected() {
        let mut root = doc();
        root["authenticated"]["max_chars"] = serde_json::json!(0);
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. } if field == "authenticated.max_chars")
        );
    }

    #[test]
    fn non_boolean_hashtag_allowed_rejected() {
        let mut root = doc();
        root["guest"]["hashtag_policy"]["allowed"] = serde_json::json!("no");
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. }
                if field == "guest.hashtag_policy.allowed")
        );
    }

    #[test]
    fn negative_hashtag_max_count_rejected() {
        let mut root = doc();
        root["authenticated"]["hashtag_policy"]["max_count"] = serde_json::json!(-1);
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. }
                if field == "authenticated.hashtag_policy.max_count")
        );
    }

    #[test]
    fn absent_hashtag_max_count_means_unbounded() {
        let mut root = doc();
        root["authenticated"]["hashtag_policy"]
            .as_object_mut()
            .unwrap()
            .remove("max_count");
        let rules = RuleSet::from_json(&root.to_string()).unwrap();
        assert_eq!(rules.authenticated.hashtag_policy.max_count, None);
    }

    #[test]
    fn zero_conversation_token_budget_rejected() {
        let mut root = doc();
        root["conversation"]["token_budget"] = serde_json::json!(0);
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. }
                if field == "conversation.token_budget")
        );
    }

    #[test]
    fn template_without_count_placeholder_rejected() {
        let mut root = doc();
        root["guest"]["base_prompt_template"] = serde_json::json!("write some tweets");
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. }
                if field == "guest.base_prompt_template")
        );
    }

    #[test]
    fn missing_examples_defaults_to_empty() {
        let mut root = doc();
        root["guest"].as_object_mut().unwrap().remove("examples");
        let rules = RuleSet::from_json(&root.to_string()).unwrap();
        assert!(rules.guest.examples.is_empty());
    }

    #[test]
    fn first_defect_in_fixed_order_wins() {
        // Both tiers broken: the guest defect must be reported because guest
        // fields are validated before authenticated ones.
        let mut root = doc();
        root["guest"]["max_chars"] = serde_json::json!(-5);
        root["authenticated"]["token_budget"] = serde_json::json!(0);
        let err = RuleSet::from_json(&root.to_string()).unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid { field, .. } if field == "guest.max_chars"));
    }

    #[test]
    fn non_json_document_is_a_parse_error() {
        let err = RuleSet::from_json("not json at all").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn post_count_override_respected() {
        let mut root = doc();
        root["guest"]["post_count"] = serde_json::json!(5);
        let rules = RuleSet::from_json(&root.to_string()).unwrap();
        assert_eq!(rules.guest.post_count, 5);
    }

    #[test]
    fn zero_post_count_override_rejected() {
        let mut root = doc();
        root["guest"]["post_count"] = serde_json::json!(0);
        assert!(RuleSet::from_json(&root.to_string()).is_err());
    }
}
