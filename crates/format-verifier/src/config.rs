//! Verification configuration
//!
//! Which categories a round trip checks and which findings fail it. The
//! configuration is always an explicit value handed to [`Verifier`]; the
//! only defaults are [`DEFAULT_CATEGORIES`] and [`PassPolicy::PreserveAll`],
//! applied by [`VerifyConfig::default`] and to fields a TOML file omits.
//!
//! [`Verifier`]: crate::Verifier

use crate::error::VerifyError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::{FormatCategory, PassPolicy, DEFAULT_CATEGORIES};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Categories to verify and the policy that judges them
///
/// An empty category set is honoured: a round trip then checks nothing and
/// returns an empty result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Categories checked by a round trip, in category order
    #[serde(default = "default_categories")]
    pub categories: BTreeSet<FormatCategory>,
    /// Which findings fail a check
    #[serde(default)]
    pub policy: PassPolicy,
}

fn default_categories() -> BTreeSet<FormatCategory> {
    DEFAULT_CATEGORIES.into_iter().collect()
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            policy: PassPolicy::default(),
        }
    }
}

impl VerifyConfig {
    pub fn new(categories: impl IntoIterator<Item = FormatCategory>, policy: PassPolicy) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            policy,
        }
    }

    /// Build a configuration from category names such as `"track_changes"`
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::UnknownCategory`] for a name that is not a
    /// supported category.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        policy: PassPolicy,
    ) -> Result<Self, VerifyError> {
        let categories = names
            .iter()
            .map(|name| name.as_ref().parse::<FormatCategory>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { categories, policy })
    }

    /// Load configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use format_verifier::VerifyConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = VerifyConfig::from_file("verify.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use format_verifier::VerifyConfig;
    /// use shared_types::PassPolicy;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = VerifyConfig::from_str(r#"
    ///     categories = ["comments"]
    ///     policy = "critical_only"
    /// "#)?;
    /// assert_eq!(config.policy, PassPolicy::CriticalOnly);
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse verification config TOML")
    }

    pub fn with_policy(mut self, policy: PassPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = FormatCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }
}
