//! Ordered rewrite vocabulary the title normalizer runs.

use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUPPORTED_RULES_VERSION: u32 = 1;

/// Vocabulary shipped with the crate.
pub const BUILTIN_RULES_YAML: &str = include_str!("../../../rules/title_rules.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    pub version: u32,
    #[serde(default)]
    pub passes: Vec<RewritePass>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewritePass {
    pub name: String,
    #[serde(flatten)]
    pub rule: RewriteRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteRule {
    Pattern {
        pattern: String,
        #[serde(default)]
        replace: String,
    },
    Words {
        words: Vec<String>,
        #[serde(default)]
        replace: String,
    },
    Pad {
        words: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("reading rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing rules: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported rules version {0} (expected {expected})", expected = SUPPORTED_RULES_VERSION)]
    UnsupportedVersion(u32),
    #[error("pass `{pass}` has an empty word list")]
    EmptyWords { pass: String },
    #[error("pass `{pass}` does not compile: {source}")]
    Pattern {
        pass: String,
        #[source]
        source: regex::Error,
    },
}

impl RuleFile {
    pub fn from_yaml(text: &str) -> Result<Self, RulesError> {
        let rules: RuleFile = serde_yaml::from_str(text)?;
        if rules.version != SUPPORTED_RULES_VERSION {
            return Err(RulesError::UnsupportedVersion(rules.version));
        }
        Ok(rules)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_yaml(BUILTIN_RULES_YAML)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPass {
    name: String,
    regex: Regex,
    replacement: String,
    expand: bool,
}

impl CompiledPass {
    pub(crate) fn compile(pass: &RewritePass) -> Result<Self, RulesError> {
        let (pattern, replacement, expand) = match &pass.rule {
            RewriteRule::Pattern { pattern, replace } => (pattern.clone(), replace.clone(), true),
            RewriteRule::Words { words, replace } => {
                (word_alternation(&pass.name, words)?, replace.clone(), false)
            }
            RewriteRule::Pad { words } => {
                (word_alternation(&pass.name, words)?, " ${0} ".to_string(), true)
            }
        };
        let regex = Regex::new(&pattern).map_err(|source| RulesError::Pattern {
            pass: pass.name.clone(),
            source,
        })?;
        Ok(Self {
            name: pass.name.clone(),
            regex,
            replacement,
            expand,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(&self, input: &str) -> String {
        if self.expand {
            self.regex
                .replace_all(input, self.replacement.as_str())
                .into_owned()
        } else {
            self.regex
                .replace_all(input, NoExpand(&self.replacement))
                .into_owned()
        }
    }
}

/// `\b(?:…)\b` over escaped, lower-cased words; longer phrases are tried first so
/// "web developer" wins over "developer" at the same position.
fn word_alternation(pass: &str, words: &[String]) -> Result<String, RulesError> {
    let mut words: Vec<String> = words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Err(RulesError::EmptyWords {
            pass: pass.to_string(),
        });
    }
    words.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    words.dedup();
    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Ok(format!(r"\b(?:{body})\b"))
}
