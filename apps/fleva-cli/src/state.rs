//! Application state - the wired post client shared by all commands.

use std::sync::Arc;

use fleva_core::PostClient;
use fleva_core::domain::ActorId;
use fleva_core::error::RemoteError;
use fleva_infra::{FilePostMirror, HttpPostRemote};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub client: PostClient,
    pub actor: ActorId,
}

impl AppState {
    /// Build the post client from configuration.
    pub fn new(config: &AppConfig) -> Result<Self, RemoteError> {
        let remote = Arc::new(HttpPostRemote::new(&config.remote)?);
        let mirror = Arc::new(FilePostMirror::new(config.mirror.clone()));

        tracing::debug!(
            api_base = %remote.base_url(),
            mirror = %mirror.path().display(),
            actor = %config.actor,
            "Post client ready"
        );

        Ok(Self {
            client: PostClient::new(remote, mirror),
            actor: config.actor.clone(),
        })
    }
}
