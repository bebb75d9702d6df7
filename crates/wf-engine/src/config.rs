//! Configuration for an engine instance.

use std::time::Duration;

use wf_core::LanguageCode;

/// What to do when a game already has an operation in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusyPolicy {
    /// Fail fast with `GameBusy`.
    #[default]
    Reject,
    /// Wait for the in-flight operation to finish.
    Queue,
}

/// What to do when removing a location or adventure that live games depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Refuse with `HasActiveGames`.
    #[default]
    Reject,
    /// Discard the dependent games first.
    Cascade,
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Language used when a game is started without one.
    pub default_language: LanguageCode,
    /// What an operation on a busy game does.
    pub busy_policy: BusyPolicy,
    /// What removing an authored row with live games does.
    pub removal_policy: RemovalPolicy,
    /// Wall-clock budget for a single script execution.
    pub script_timeout: Duration,
    /// Log the adventure's initial text when a game starts.
    pub announce_initial_text: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::default(),
            busy_policy: BusyPolicy::Reject,
            removal_policy: RemovalPolicy::Reject,
            script_timeout: Duration::from_secs(2),
            announce_initial_text: true,
        }
    }
}

impl EngineConfig {
    /// Set the fallback language.
    pub fn with_default_language(mut self, language: LanguageCode) -> Self {
        self.default_language = language;
        self
    }

    /// Set how concurrent operations on one game are handled.
    pub fn with_busy_policy(mut self, policy: BusyPolicy) -> Self {
        self.busy_policy = policy;
        self
    }

    /// Set how removals with live games are handled.
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Set the per-script time budget (at least one millisecond).
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Enable or disable logging the adventure's initial text.
    pub fn with_initial_text(mut self, announce: bool) -> Self {
        self.announce_initial_text = announce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.default_language.as_str(), "en");
        assert_eq!(cfg.busy_policy, BusyPolicy::Reject);
        assert_eq!(cfg.removal_policy, RemovalPolicy::Reject);
        assert_eq!(cfg.script_timeout, Duration::from_secs(2));
        assert!(cfg.announce_initial_text);
    }

    #[test]
    fn builder_chain() {
        let cfg = EngineConfig::default()
            .with_default_language(LanguageCode::parse("es").unwrap())
            .with_busy_policy(BusyPolicy::Queue)
            .with_removal_policy(RemovalPolicy::Cascade)
            .with_initial_text(false);
        assert_eq!(cfg.default_language.as_str(), "es");
        assert_eq!(cfg.busy_policy, BusyPolicy::Queue);
        assert_eq!(cfg.removal_policy, RemovalPolicy::Cascade);
        assert!(!cfg.announce_initial_text);
    }

    #[test]
    fn timeout_clamped() {
        let cfg = EngineConfig::default().with_script_timeout(Duration::ZERO);
        assert_eq!(cfg.script_timeout, Duration::from_millis(1));
    }
}
