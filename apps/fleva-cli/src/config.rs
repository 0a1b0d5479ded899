//! Application configuration loaded from environment variables and flags.

use fleva_core::domain::ActorId;
use fleva_infra::{FileMirrorConfig, RemoteConfig};

use crate::args::Cli;

/// Actor used when none is configured.
const DEFAULT_ACTOR: &str = "anonymous";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub mirror: FileMirrorConfig,
    pub actor: ActorId,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            remote: RemoteConfig::from_env(),
            mirror: FileMirrorConfig::from_env(),
            actor: ActorId::new(
                std::env::var("FLEVA_ACTOR_ID").unwrap_or_else(|_| DEFAULT_ACTOR.to_string()),
            ),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(base_url) = &cli.api_base {
            self.remote.base_url.clone_from(base_url);
        }
        if let Some(path) = &cli.mirror {
            self.mirror.path.clone_from(path);
        }
        if let Some(actor) = &cli.actor {
            self.actor = ActorId::new(actor.as_str());
        }
        self
    }
}
