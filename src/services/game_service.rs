use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::game::GameRepository,
    dto::{scoreboard::Scoreboard, setup::GameSetupRequest},
    error::ServiceError,
    services::countdown_service::CountdownTimer,
    state::{
        SharedState,
        game::{GameConfiguration, GameState, Score, Variant},
        round::{Outcome, commit_round},
        standings::{Standing, leader, standings},
        state_machine::{GameEvent, GamePhase, SessionStateMachine},
    },
};

/// Targets a Skyjo table may choose from.
const SKYJO_TARGET_RANGE: std::ops::RangeInclusive<Score> = 80..=120;

/// One game being played: its state, its phase, and its round timer.
///
/// Callers drive a session from a single task; the repository assumes at most
/// one `end_round` in flight per variant.
pub struct GameSession {
    id: Uuid,
    repository: GameRepository,
    state: GameState,
    machine: SessionStateMachine,
    countdown: Option<CountdownTimer>,
}

impl GameSession {
    fn begin(repository: GameRepository, state: GameState) -> Result<Self, ServiceError> {
        let mut machine = SessionStateMachine::new();
        machine.apply(GameEvent::Start {
            round: state.round_number(),
        })?;

        let countdown = state
            .configuration()
            .countdown_seconds
            .map(|_| CountdownTimer::new());

        Ok(Self {
            id: Uuid::new_v4(),
            repository,
            state,
            machine,
            countdown,
        })
    }

    fn restart_countdown(&self) {
        if let (Some(timer), Some(seconds)) = (
            &self.countdown,
            self.state.configuration().countdown_seconds,
        ) {
            timer.reset(seconds);
        }
    }

    fn stop_countdown(&self) {
        if let Some(timer) = &self.countdown {
            timer.stop();
        }
    }

    async fn forget_saved_game(&self) {
        let variant = self.variant();
        if let Err(err) = self.repository.clear(variant).await {
            warn!(%variant, error = %err, "failed to clear saved game");
        }
    }

    /// Session identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Game family.
    pub fn variant(&self) -> Variant {
        self.state.configuration().variant
    }

    /// Settings fixed at setup.
    pub fn configuration(&self) -> &GameConfiguration {
        self.state.configuration()
    }

    /// Current phase.
    pub fn phase(&self) -> &GamePhase {
        self.machine.phase()
    }

    /// Round currently being entered.
    pub fn round_number(&self) -> u32 {
        self.state.round_number()
    }

    /// Cumulative totals in join order.
    pub fn totals(&self) -> &indexmap::IndexMap<String, Score> {
        self.state.totals()
    }

    /// Inputs entered for the round in progress.
    pub fn pending_round(&self) -> &indexmap::IndexMap<String, Score> {
        self.state.pending_round()
    }

    /// Standings best-first under the configured direction.
    pub fn standings(&self) -> Vec<Standing> {
        standings(self.state.totals(), self.state.configuration().direction)
    }

    /// Player currently winning.
    pub fn leader(&self) -> Result<Standing, ServiceError> {
        Ok(leader(
            self.state.totals(),
            self.state.configuration().direction,
        )?)
    }

    /// Rendering view of the game.
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::from(&self.state)
    }

    /// Round timer, when the game runs one.
    pub fn countdown(&self) -> Option<&CountdownTimer> {
        self.countdown.as_ref()
    }

    /// Whether a time-up notification should still be shown. A finished or
    /// abandoned game suppresses it.
    pub fn should_surface_time_up(&self) -> bool {
        self.machine.accepts_rounds()
    }

    /// Set `name`'s input for the round in progress, replacing any earlier value.
    pub fn record_score(&mut self, name: &str, value: Score) -> Result<(), ServiceError> {
        if !self.machine.accepts_rounds() {
            return Err(ServiceError::InvalidState(format!(
                "scores cannot be entered while {:?}",
                self.machine.phase()
            )));
        }

        if !self.state.set_pending(name, value) {
            return Err(ServiceError::UnknownPlayer(name.to_string()));
        }
        Ok(())
    }

    /// Commit the round in progress.
    ///
    /// The pre-round state is saved first so an interrupted session can be
    /// resumed; a failed save is logged and play continues from memory. On
    /// a finished game the saved game is dropped and the timer stopped;
    /// otherwise the timer restarts for the next round.
    pub async fn end_round(&mut self) -> Result<Outcome, ServiceError> {
        if !self.machine.accepts_rounds() {
            return Err(ServiceError::InvalidState(format!(
                "cannot end a round while {:?}",
                self.machine.phase()
            )));
        }

        let variant = self.variant();
        if let Err(err) = self.repository.save(variant, &self.state).await {
            warn!(
                %variant,
                round = self.state.round_number(),
                error = %err,
                "failed to persist round; continuing in memory"
            );
        }

        let outcome = commit_round(&mut self.state)?;
        self.machine.apply(GameEvent::RoundEnded(outcome.clone()))?;

        match &outcome {
            Outcome::Finished { winner, loser } => {
                self.stop_countdown();
                self.forget_saved_game().await;
                info!(session = %self.id, %variant, %winner, %loser, "game finished");
            }
            Outcome::Continuing { round } => {
                self.restart_countdown();
                info!(session = %self.id, %variant, round = *round, "round committed");
            }
        }

        Ok(outcome)
    }

    /// Abandon the game and drop its saved copy.
    pub async fn cancel(&mut self) -> Result<(), ServiceError> {
        self.machine.apply(GameEvent::Cancel)?;
        self.stop_countdown();
        self.forget_saved_game().await;
        info!(session = %self.id, variant = %self.variant(), "game canceled");
        Ok(())
    }

    /// Dismiss the final result of a finished game.
    pub async fn acknowledge(&mut self) -> Result<(), ServiceError> {
        self.machine.apply(GameEvent::Acknowledge)?;
        self.forget_saved_game().await;
        Ok(())
    }
}

/// Start a brand-new game, replacing any saved game of the same variant.
pub async fn start_game(
    state: &SharedState,
    request: GameSetupRequest,
) -> Result<GameSession, ServiceError> {
    request.validate()?;

    let GameSetupRequest {
        variant,
        player_names,
        target_score,
        direction,
        use_countdown,
        countdown_seconds,
    } = request;

    let customizable = variant.is_customizable();
    if !customizable && (direction.is_some() || use_countdown || countdown_seconds.is_some()) {
        return Err(ServiceError::InvalidInput(format!(
            "{variant} does not support a custom direction or countdown"
        )));
    }
    if variant == Variant::Skyjo
        && let Some(target) = target_score
        && !SKYJO_TARGET_RANGE.contains(&target)
    {
        return Err(ServiceError::InvalidInput(format!(
            "Skyjo target must be between {} and {}",
            SKYJO_TARGET_RANGE.start(),
            SKYJO_TARGET_RANGE.end()
        )));
    }

    let preset = state.config().preset(variant);
    // An explicit length turns the timer on.
    let countdown = if customizable && (use_countdown || countdown_seconds.is_some()) {
        countdown_seconds.or(preset.countdown_seconds)
    } else {
        None
    };
    let configuration = GameConfiguration::new(
        variant,
        player_names
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect(),
        target_score.unwrap_or(preset.target_score),
        direction.unwrap_or(preset.direction),
        countdown,
    )?;

    let repository = state.repository().clone();
    if let Err(err) = repository.clear(variant).await {
        warn!(%variant, error = %err, "failed to clear previous saved game");
    }

    let session = GameSession::begin(repository, GameState::new(configuration))?;
    session.restart_countdown();
    info!(
        session = %session.id,
        %variant,
        players = session.configuration().player_names.len(),
        target = session.configuration().target_score,
        "game started"
    );
    Ok(session)
}

/// Resume the saved game of `variant`, if any.
///
/// The saved inputs are folded exactly like an ended round. When that fold
/// reaches the target the session comes back already finished and the saved
/// game is dropped.
pub async fn resume_game(state: &SharedState, variant: Variant) -> Option<GameSession> {
    let repository = state.repository().clone();
    let mut game_state = repository.load(variant).await?;

    let outcome = match commit_round(&mut game_state) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(%variant, error = %err, "saved game could not be replayed");
            return None;
        }
    };

    let mut session = match GameSession::begin(repository, game_state) {
        Ok(session) => session,
        Err(err) => {
            warn!(%variant, error = %err, "saved game could not be resumed");
            return None;
        }
    };

    match outcome {
        Outcome::Continuing { round } => {
            session.restart_countdown();
            info!(session = %session.id, %variant, round, "game resumed");
        }
        finished @ Outcome::Finished { .. } => {
            if let Err(err) = session.machine.apply(GameEvent::RoundEnded(finished)) {
                warn!(%variant, error = %err, "saved game could not be resumed");
                return None;
            }
            session.forget_saved_game().await;
            info!(session = %session.id, %variant, "resumed game was already over");
        }
    }

    Some(session)
}

/// Variants with a saved game that can be resumed.
///
/// Each flagged save is read back; one that cannot be restored is dropped
/// and not offered.
pub async fn resumable_games(state: &SharedState) -> Vec<Variant> {
    let mut variants = Vec::new();
    for variant in Variant::ALL {
        if state.repository().load(variant).await.is_some() {
            variants.push(variant);
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc, time::Duration};

    use futures::future::BoxFuture;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            storage::{StorageError, StorageResult},
        },
        services::countdown_service::CountdownEvent,
        state::{AppState, game::Direction},
    };

    struct FailingStore;

    fn offline() -> io::Error {
        io::Error::other("disk unplugged")
    }

    impl GameStore for FailingStore {
        fn read_record(&self, _key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
            Box::pin(async { Err(StorageError::read("offline".into(), offline())) })
        }

        fn write_record(&self, _key: &str, _payload: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(StorageError::write("offline".into(), offline())) })
        }

        fn read_flag(&self, _key: &str) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Err(StorageError::read("offline".into(), offline())) })
        }

        fn write_flag(&self, _key: &str, _value: bool) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(StorageError::write("offline".into(), offline())) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(StorageError::read("offline".into(), offline())) })
        }
    }

    fn shared() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryGameStore::new()))
    }

    fn custom(names: &[&str], target: Score) -> GameSetupRequest {
        let mut request = GameSetupRequest::new(
            Variant::Custom,
            names.iter().map(|name| name.to_string()).collect(),
        );
        request.target_score = Some(target);
        request
    }

    #[tokio::test]
    async fn plays_to_the_target() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 50)).await.unwrap();
        assert_eq!(session.phase(), &GamePhase::Playing { round: 1 });
        assert!(resumable_games(&state).await.is_empty());

        session.record_score("A", 20).unwrap();
        session.record_score("B", 10).unwrap();
        assert_eq!(
            session.end_round().await.unwrap(),
            Outcome::Continuing { round: 2 }
        );
        assert_eq!(resumable_games(&state).await, vec![Variant::Custom]);
        assert!(session.pending_round().values().all(|value| *value == 0));

        session.record_score("A", 35).unwrap();
        session.record_score("B", 5).unwrap();
        let outcome = session.end_round().await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Finished {
                winner: "A".into(),
                loser: "B".into()
            }
        );
        assert_eq!(session.totals()["A"], 55);
        assert_eq!(session.round_number(), 2);
        assert!(resumable_games(&state).await.is_empty());

        assert!(matches!(
            session.end_round().await,
            Err(ServiceError::InvalidState(_))
        ));
        session.acknowledge().await.unwrap();
        assert_eq!(session.phase(), &GamePhase::Idle);
    }

    #[tokio::test]
    async fn presets_fill_omitted_fields() {
        let state = shared();
        let session = start_game(
            &state,
            GameSetupRequest::new(Variant::Skyjo, vec!["Ana".into(), " Ben ".into()]),
        )
        .await
        .unwrap();

        let configuration = session.configuration();
        assert_eq!(configuration.target_score, 100);
        assert_eq!(configuration.direction, Direction::DescendingWins);
        assert_eq!(configuration.countdown_seconds, None);
        assert_eq!(configuration.player_names, ["Ana", "Ben"]);
        assert!(session.countdown().is_none());
    }

    #[tokio::test]
    async fn setup_rejections() {
        let state = shared();

        let mut belote = GameSetupRequest::new(Variant::Belote, vec!["Nous".into(), "Eux".into()]);
        belote.direction = Some(Direction::DescendingWins);
        assert!(matches!(
            start_game(&state, belote).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let mut skyjo = GameSetupRequest::new(Variant::Skyjo, vec!["Ana".into(), "Ben".into()]);
        skyjo.target_score = Some(200);
        assert!(matches!(
            start_game(&state, skyjo).await,
            Err(ServiceError::InvalidInput(_))
        ));

        assert!(matches!(
            start_game(&state, custom(&["A"], 50)).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn unknown_player_is_rejected() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 50)).await.unwrap();
        assert!(matches!(
            session.record_score("Z", 3),
            Err(ServiceError::UnknownPlayer(name)) if name == "Z"
        ));
    }

    #[tokio::test]
    async fn resume_replays_the_interrupted_round() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 100)).await.unwrap();
        session.record_score("A", 20).unwrap();
        session.record_score("B", 10).unwrap();
        session.end_round().await.unwrap();
        session.record_score("A", 7).unwrap();
        session.end_round().await.unwrap();
        drop(session);

        let resumed = resume_game(&state, Variant::Custom).await.unwrap();
        assert_eq!(resumed.totals()["A"], 27);
        assert_eq!(resumed.totals()["B"], 10);
        assert_eq!(resumed.round_number(), 3);
        assert_eq!(resumed.phase(), &GamePhase::Playing { round: 3 });
        assert!(resumed.pending_round().values().all(|value| *value == 0));
    }

    #[tokio::test]
    async fn resume_of_a_decided_game_comes_back_finished() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 30)).await.unwrap();
        session.record_score("A", 10).unwrap();
        session.end_round().await.unwrap();

        // Save the next round's inputs without folding them, as if the host
        // died mid-round.
        session.state.set_pending("B", 40);
        state
            .repository()
            .save(Variant::Custom, &session.state)
            .await
            .unwrap();
        drop(session);

        let resumed = resume_game(&state, Variant::Custom).await.unwrap();
        assert_eq!(
            resumed.phase(),
            &GamePhase::Finished {
                winner: "B".into(),
                loser: "A".into()
            }
        );
        assert!(resumable_games(&state).await.is_empty());
    }

    #[tokio::test]
    async fn new_game_replaces_saved_one() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 100)).await.unwrap();
        session.record_score("A", 5).unwrap();
        session.end_round().await.unwrap();

        let _fresh = start_game(&state, custom(&["C", "D"], 100)).await.unwrap();
        assert!(resume_game(&state, Variant::Custom).await.is_none());
    }

    #[tokio::test]
    async fn cancel_drops_the_saved_game() {
        let state = shared();
        let mut session = start_game(&state, custom(&["A", "B"], 100)).await.unwrap();
        session.record_score("B", 5).unwrap();
        session.end_round().await.unwrap();

        session.cancel().await.unwrap();
        assert_eq!(session.phase(), &GamePhase::Canceled);
        assert!(resume_game(&state, Variant::Custom).await.is_none());
        assert!(session.record_score("A", 1).is_err());
    }

    #[tokio::test]
    async fn storage_failures_do_not_interrupt_play() {
        let state = AppState::new(AppConfig::default(), Arc::new(FailingStore));
        let mut session = start_game(&state, custom(&["A", "B"], 50)).await.unwrap();

        session.record_score("A", 30).unwrap();
        assert_eq!(
            session.end_round().await.unwrap(),
            Outcome::Continuing { round: 2 }
        );
        session.record_score("A", 30).unwrap();
        assert!(matches!(
            session.end_round().await.unwrap(),
            Outcome::Finished { .. }
        ));

        assert!(resume_game(&state, Variant::Custom).await.is_none());
        assert!(resumable_games(&state).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_suppresses_time_up() {
        let state = shared();
        let mut request = custom(&["A", "B"], 50);
        request.use_countdown = true;
        request.countdown_seconds = Some(10);
        let mut session = start_game(&state, request).await.unwrap();

        let mut rx = session.countdown().unwrap().subscribe();
        assert_eq!(
            rx.recv().await.unwrap(),
            CountdownEvent::Tick { remaining: 9 }
        );
        assert!(session.should_surface_time_up());

        session.record_score("A", 60).unwrap();
        session.end_round().await.unwrap();

        assert!(!session.should_surface_time_up());
        assert!(timeout(Duration::from_secs(30), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn unreadable_save_is_not_offered() {
        let store = MemoryGameStore::new();
        let state = AppState::new(AppConfig::default(), Arc::new(store.clone()));
        let mut session = start_game(
            &state,
            GameSetupRequest::new(Variant::Belote, vec!["Nous".into(), "Eux".into()]),
        )
        .await
        .unwrap();
        session.record_score("Nous", 80).unwrap();
        session.end_round().await.unwrap();
        drop(session);
        assert_eq!(resumable_games(&state).await, vec![Variant::Belote]);

        store
            .write_record("BeloteGameData", b"{not json".to_vec())
            .await
            .unwrap();

        assert!(resumable_games(&state).await.is_empty());
        assert!(resume_game(&state, Variant::Belote).await.is_none());
        assert!(!state.repository().is_ongoing(Variant::Belote).await);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_restarts_the_custom_timer() {
        let state = shared();
        let mut request = custom(&["A", "B"], 100);
        request.countdown_seconds = Some(30);
        let mut session = start_game(&state, request).await.unwrap();
        assert_eq!(session.countdown().unwrap().remaining(), Some(30));

        session.record_score("A", 10).unwrap();
        session.end_round().await.unwrap();
        drop(session);

        let resumed = resume_game(&state, Variant::Custom).await.unwrap();
        assert_eq!(resumed.configuration().countdown_seconds, Some(30));
        assert_eq!(resumed.countdown().unwrap().remaining(), Some(30));
    }

    #[tokio::test]
    async fn countdown_length_alone_turns_the_timer_on() {
        let state = shared();
        let mut request = custom(&["A", "B"], 100);
        request.countdown_seconds = Some(45);

        let session = start_game(&state, request).await.unwrap();
        assert_eq!(session.configuration().countdown_seconds, Some(45));
        assert!(session.countdown().is_some());
        session.countdown().unwrap().stop();
    }

    #[tokio::test(start_paused = true)]
    async fn continuing_round_restarts_the_timer() {
        let state = shared();
        let mut request = custom(&["A", "B"], 500);
        request.use_countdown = true;
        let mut session = start_game(&state, request).await.unwrap();
        let timer = session.countdown().unwrap();
        assert_eq!(timer.remaining(), Some(120));

        let mut rx = timer.subscribe();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        assert_eq!(session.countdown().unwrap().remaining(), Some(118));

        session.end_round().await.unwrap();
        assert_eq!(session.countdown().unwrap().remaining(), Some(120));
    }
}
