//! Session registry for spawning and looking up session actors.

use super::{
    actor::{SessionActor, SessionHandle},
    config::SessionConfig,
    messages::{Outbox, SessionCommand},
};
use crate::game::{
    GameStateView,
    constants::SESSION_CODE_LENGTH,
    entities::{PlayerId, SessionCode},
    errors::{GameError, Result},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A random six-character code over `[0-9A-Z]`.
pub fn generate_code<R: Rng>(rng: &mut R) -> SessionCode {
    let code: String = (0..SESSION_CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    SessionCode::new(&code)
}

/// Session manager for managing live sessions
#[derive(Clone)]
pub struct SessionManager {
    /// Active session handles
    sessions: Arc<RwLock<HashMap<SessionCode, SessionHandle>>>,

    /// Configuration applied to new sessions
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Create a session hosted by `host_id` and spawn its actor
    ///
    /// The host receives `gameCreated` on `outbox` once the actor is running.
    ///
    /// # Arguments
    ///
    /// * `host_id` - Connection ID of the host
    /// * `host_name` - Normalized display name
    /// * `outbox` - The host's outbound queue
    ///
    /// # Returns
    ///
    /// * `Result<SessionHandle>` - Handle to the new session, or
    ///   `CodeSpaceExhausted` if no unused code turned up
    pub async fn create_session(
        &self,
        host_id: PlayerId,
        host_name: String,
        outbox: Outbox,
    ) -> Result<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let code = self.allocate_code(&sessions)?;

        let (actor, handle) = SessionActor::new(
            code.clone(),
            host_id,
            host_name,
            outbox,
            self.config.clone(),
            StdRng::from_os_rng(),
        );
        sessions.insert(code.clone(), handle.clone());
        drop(sessions);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned session {}", code);

        Ok(handle)
    }

    fn allocate_code(&self, taken: &HashMap<SessionCode, SessionHandle>) -> Result<SessionCode> {
        let mut rng = rand::rng();
        (0..self.config.max_code_attempts)
            .map(|_| generate_code(&mut rng))
            .find(|code| !taken.contains_key(code))
            .ok_or(GameError::CodeSpaceExhausted)
    }

    /// Get a live session handle
    pub async fn get_session(&self, code: &SessionCode) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(code).filter(|h| !h.is_closed()).cloned()
    }

    /// Seat a player in an existing session
    ///
    /// # Returns
    ///
    /// * `Result<SessionHandle>` - Handle to the joined session
    pub async fn join_session(
        &self,
        code: &SessionCode,
        player_id: PlayerId,
        name: String,
        outbox: Outbox,
    ) -> Result<SessionHandle> {
        let handle = self
            .get_session(code)
            .await
            .ok_or(GameError::SessionNotFound)?;

        handle
            .join(player_id, name, outbox)
            .await
            .map_err(|e| match e {
                GameError::SessionClosed => GameError::SessionNotFound,
                other => other,
            })?;

        Ok(handle)
    }

    /// Forward a player request to its session
    pub async fn submit(
        &self,
        code: &SessionCode,
        requester: PlayerId,
        command: SessionCommand,
    ) -> Result<()> {
        let handle = self
            .get_session(code)
            .await
            .ok_or(GameError::SessionNotFound)?;
        handle.command(requester, command).await
    }

    /// Remove a departed player, dropping the session once it is empty
    pub async fn disconnect(&self, code: &SessionCode, player_id: PlayerId) {
        let Some(handle) = self.get_session(code).await else {
            self.remove_session(code).await;
            return;
        };
        if handle.disconnect(player_id).await {
            self.remove_session(code).await;
            log::info!("Session {} is empty, removed", code);
        }
    }

    /// Get a session snapshot
    pub async fn get_state(&self, code: &SessionCode) -> Result<GameStateView> {
        let handle = self
            .get_session(code)
            .await
            .ok_or(GameError::SessionNotFound)?;
        handle.state().await.ok_or(GameError::SessionNotFound)
    }

    /// Forget a session. Returns whether it was registered.
    pub async fn remove_session(&self, code: &SessionCode) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(code).is_some()
    }

    /// Stop every session actor
    pub async fn close_all(&self) {
        let handles: Vec<SessionHandle> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, handle)| handle).collect()
        };
        for handle in &handles {
            handle.close().await;
        }
        log::info!("Closed {} sessions", handles.len());
    }

    /// Get active session count
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
