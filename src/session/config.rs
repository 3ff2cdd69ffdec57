use serde::{Deserialize, Serialize};

/// What `start_interaction` does while an interaction is already running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartPolicy {
    /// Ignore the request until the session is idle or errored
    #[default]
    Ignore,
    /// Tear down the running interaction, then start a new one.
    /// A session that is still connecting is never replaced.
    Replace,
}

/// Configuration for the session orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub restart_policy: RestartPolicy,
}

impl SessionConfig {
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }
}
