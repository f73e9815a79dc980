//! Runtime feature flags.

use std::collections::HashSet;

/// Switches policy evaluation from the legacy "any policy applies" query
/// to aggregated policy requirements.
pub const POLICY_REQUIREMENTS: &str = "policy-requirements";

/// Source of runtime feature toggles.
pub trait FeatureService: Send + Sync {
    fn is_enabled(&self, flag: &str) -> bool;
}

/// Feature flags fixed at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureService {
    enabled: HashSet<String>,
}

impl StaticFeatureService {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: flags.into_iter().map(Into::into).collect(),
        }
    }
}

impl FeatureService for StaticFeatureService {
    fn is_enabled(&self, flag: &str) -> bool {
        self.enabled.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_flags_are_enabled() {
        let flags = StaticFeatureService::new([POLICY_REQUIREMENTS]);
        assert!(flags.is_enabled(POLICY_REQUIREMENTS));
        assert!(!flags.is_enabled("something-else"));
        assert!(!StaticFeatureService::default().is_enabled(POLICY_REQUIREMENTS));
    }
}
