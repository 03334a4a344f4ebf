use super::schema::RuleSet;
use crate::error::ConfigError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Bundled example rules document, used when no primary document is found.
pub const DEFAULT_RULES_JSON: &str = include_str!("../../rules/default.json");

/// Loads the versioned rules document from a designated directory.
///
/// Resolution never leaves `rules_dir`: absolute names and `..` components
/// are rejected outright. When the named document does not exist the store
/// falls back to the bundled [`DEFAULT_RULES_JSON`].
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules_dir: PathBuf,
}

impl RuleStore {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
        }
    }

    /// Load and validate a rules document. `None` loads the bundled default.
    pub fn load(&self, name: Option<&str>) -> Result<RuleSet, ConfigError> {
        let Some(name) = name else {
            return RuleSet::from_json(DEFAULT_RULES_JSON);
        };

        let path = self.resolve(name)?;
        if !path.is_file() {
            tracing::warn!(
                rules = name,
                "rules document not found, using bundled default"
            );
            return RuleSet::from_json(DEFAULT_RULES_JSON);
        }

        let doc = fs::read_to_string(&path)?;
        let rules = RuleSet::from_json(&doc)?;
        tracing::info!(rules = name, version = %rules.version, "rules document loaded");
        Ok(rules)
    }

    /// Lexically resolve `name` inside the rules directory.
    fn resolve(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let candidate = Path::new(name);
        let escapes = candidate.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes {
            return Err(ConfigError::PathEscape(name.to_string()));
        }
        Ok(self.rules_dir.join(candidate))
    }
}
