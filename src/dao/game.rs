use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    dao::{
        game_store::GameStore,
        models::GameRecord,
        storage::{StorageError, StorageResult},
    },
    state::game::{GameState, Variant},
};

/// Storage key holding the saved record of `variant`.
pub fn record_key(variant: Variant) -> String {
    format!("{variant}GameData")
}

/// Storage key holding the "resumable game exists" flag of `variant`.
pub fn ongoing_key(variant: Variant) -> String {
    format!("party{variant}Ongoing")
}

/// Saves, restores and clears in-progress games, one slot per variant.
#[derive(Clone)]
pub struct GameRepository {
    store: Arc<dyn GameStore>,
}

impl GameRepository {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Write `state` as the variant's record and mark it ongoing.
    pub async fn save(&self, variant: Variant, state: &GameState) -> StorageResult<()> {
        let key = record_key(variant);
        let payload = serde_json::to_vec(&GameRecord::from(state))
            .map_err(|source| StorageError::write(format!("encoding `{key}`"), source))?;

        self.store.write_record(&key, payload).await?;
        self.store.write_flag(&ongoing_key(variant), true).await?;

        debug!(%variant, round = state.round_number(), "game saved");
        Ok(())
    }

    /// Restore the variant's record when its ongoing flag is set.
    ///
    /// Pending inputs are returned as stored; folding them is up to the
    /// caller. A flagged record that is missing or unreadable is logged,
    /// its flag dropped, and reported as `None`.
    pub async fn load(&self, variant: Variant) -> Option<GameState> {
        if !self.is_ongoing(variant).await {
            return None;
        }

        match self.read_state(variant).await {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                warn!(%variant, "ongoing flag set without a saved game; starting fresh");
                self.discard(variant).await;
                None
            }
            Err(err) => {
                warn!(%variant, error = %err, "saved game unreadable; starting fresh");
                self.discard(variant).await;
                None
            }
        }
    }

    async fn read_state(&self, variant: Variant) -> StorageResult<Option<GameState>> {
        let key = record_key(variant);
        let Some(bytes) = self.store.read_record(&key).await? else {
            return Ok(None);
        };

        let record: GameRecord = serde_json::from_slice(&bytes)
            .map_err(|source| StorageError::Corrupt { key: key.clone(), source })?;

        record
            .into_state(variant)
            .map(Some)
            .map_err(|err| StorageError::read(format!("restoring `{key}`"), err))
    }

    /// Drop the ongoing flag. The record bytes are left for the next save to
    /// overwrite.
    pub async fn clear(&self, variant: Variant) -> StorageResult<()> {
        self.store.write_flag(&ongoing_key(variant), false).await?;
        debug!(%variant, "saved game cleared");
        Ok(())
    }

    async fn discard(&self, variant: Variant) {
        if let Err(err) = self.clear(variant).await {
            warn!(%variant, error = %err, "failed to drop unreadable saved game");
        }
    }

    /// Whether a resumable game exists for `variant`. Read failures count
    /// as "no".
    pub async fn is_ongoing(&self, variant: Variant) -> bool {
        match self.store.read_flag(&ongoing_key(variant)).await {
            Ok(flag) => flag,
            Err(err) => {
                warn!(%variant, error = %err, "could not read ongoing flag");
                false
            }
        }
    }
}
