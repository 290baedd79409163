//! Score Keeper binary entrypoint: a line-oriented scorekeeper over stdin.

use std::{env, sync::Arc};

use anyhow::{Context, bail};
use score_keeper::{
    config::AppConfig,
    dao::game_store::{GameStore, memory::MemoryGameStore},
    dto::setup::GameSetupRequest,
    services::{
        countdown_service::CountdownEvent,
        game_service::{GameSession, resumable_games, resume_game, start_game},
    },
    state::{
        AppState, SharedState,
        game::{Direction, Variant},
        round::Outcome,
    },
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the storage backend (`memory` or `file`).
const STORE_ENV: &str = "SCORE_KEEPER_STORE";

const HELP: &str = "\
commands:
  list                                   games that can be resumed
  new <game> <name> <name>... [--target N] [--lowest|--highest] [--timer [SECONDS]]
  resume <game>                          continue a saved game
  score <name> <points>                  enter points for the current round
  end                                    end the current round
  standings                              show the scoreboard
  cancel                                 abandon the current game
  ack                                    dismiss a finished game
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config).await?;
    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage unavailable; games will not survive a restart");
    }
    let state = AppState::new(config, store);

    let offers = resumable_games(&state).await;
    if !offers.is_empty() {
        println!("saved games: {}", join(&offers));
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session: Option<GameSession> = None;
    let mut timer_events: Option<broadcast::Receiver<CountdownEvent>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let command = line.trim();
                if command == "quit" {
                    break;
                }
                if command.is_empty() {
                    continue;
                }
                if let Err(err) = run_command(&state, &mut session, command).await {
                    println!("error: {err}");
                }
                timer_events = session
                    .as_ref()
                    .and_then(GameSession::countdown)
                    .map(|timer| timer.subscribe());
            }
            Some(event) = next_countdown_event(&mut timer_events) => {
                if event == CountdownEvent::TimeUp
                    && session.as_ref().is_some_and(GameSession::should_surface_time_up)
                {
                    println!("time's up! enter the scores and end the round");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    Ok(())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn GameStore>> {
    let kind = env::var(STORE_ENV).unwrap_or_else(|_| "file".into());
    match kind.as_str() {
        "memory" => {
            info!("using in-memory storage");
            Ok(Arc::new(MemoryGameStore::new()))
        }
        #[cfg(feature = "file-store")]
        "file" => {
            use score_keeper::dao::game_store::file::{FileGameStore, FileStoreConfig};

            let store = FileGameStore::open(FileStoreConfig::from_env_or(config.data_dir()))
                .await
                .context("opening file store")?;
            info!(data_dir = %config.data_dir().display(), "using file storage");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "file-store"))]
        "file" => {
            let _ = config;
            warn!("file storage not compiled in; using in-memory storage");
            Ok(Arc::new(MemoryGameStore::new()))
        }
        other => bail!("unknown {STORE_ENV} value `{other}`"),
    }
}

async fn next_countdown_event(
    events: &mut Option<broadcast::Receiver<CountdownEvent>>,
) -> Option<CountdownEvent> {
    let Some(events) = events else {
        return std::future::pending().await;
    };
    loop {
        match events.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return None,
        }
    }
}

async fn run_command(
    state: &SharedState,
    session: &mut Option<GameSession>,
    command: &str,
) -> anyhow::Result<()> {
    let mut words = command.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match verb {
        "help" => println!("{HELP}"),
        "list" => {
            let offers = resumable_games(state).await;
            if offers.is_empty() {
                println!("no saved games");
            } else {
                println!("saved games: {}", join(&offers));
            }
        }
        "new" => {
            let request = parse_setup(&args)?;
            let started = start_game(state, request).await?;
            println!(
                "{} started, first to {} ends it",
                started.variant(),
                started.configuration().target_score
            );
            *session = Some(started);
        }
        "resume" => {
            let variant = parse_variant(args.first().copied())?;
            let Some(resumed) = resume_game(state, variant).await else {
                bail!("no saved {variant} game");
            };
            println!("{variant} resumed at round {}", resumed.round_number());
            print_scoreboard(&resumed);
            *session = Some(resumed);
        }
        "score" => {
            let game = active(session)?;
            let [name, points] = args.as_slice() else {
                bail!("usage: score <name> <points>");
            };
            let points = points
                .parse()
                .with_context(|| format!("`{points}` is not a number"))?;
            game.record_score(name, points)?;
        }
        "end" => {
            let game = active(session)?;
            match game.end_round().await? {
                Outcome::Continuing { round } => {
                    print_scoreboard(game);
                    println!("round {round}");
                }
                Outcome::Finished { winner, loser } => {
                    print_scoreboard(game);
                    println!("{winner} wins, {loser} finishes last (ack to dismiss)");
                }
            }
        }
        "standings" => print_scoreboard(active(session)?),
        "cancel" => {
            active(session)?.cancel().await?;
            *session = None;
            println!("game canceled");
        }
        "ack" => {
            active(session)?.acknowledge().await?;
            *session = None;
        }
        other => bail!("unknown command `{other}`, try `help`"),
    }

    Ok(())
}

fn active(session: &mut Option<GameSession>) -> anyhow::Result<&mut GameSession> {
    session
        .as_mut()
        .context("no game in progress; use `new` or `resume`")
}

fn parse_variant(word: Option<&str>) -> anyhow::Result<Variant> {
    let word = word.context("missing game name")?;
    word.parse::<Variant>().map_err(anyhow::Error::msg)
}

fn parse_setup(args: &[&str]) -> anyhow::Result<GameSetupRequest> {
    let mut args = args.iter().copied().peekable();
    let variant = parse_variant(args.next())?;
    let mut request = GameSetupRequest::new(variant, Vec::new());

    while let Some(arg) = args.next() {
        match arg {
            "--target" => {
                let value = args.next().context("--target needs a value")?;
                request.target_score = Some(value.parse().context("invalid --target")?);
            }
            "--lowest" => request.direction = Some(Direction::DescendingWins),
            "--highest" => request.direction = Some(Direction::AscendingWins),
            "--timer" => {
                request.use_countdown = true;
                if let Some(seconds) = args.next_if(|next| !next.starts_with("--")) {
                    request.countdown_seconds = Some(seconds.parse().context("invalid --timer")?);
                }
            }
            name => request.player_names.push(name.to_string()),
        }
    }

    Ok(request)
}

fn print_scoreboard(session: &GameSession) {
    let board = session.scoreboard();
    println!(
        "{} round {} (target {})",
        board.variant, board.round, board.target_score
    );
    for row in &board.rows {
        let marker = if row.is_leader { '*' } else { ' ' };
        println!("{marker}{:>2}. {:<16} {:>6}", row.rank, row.name, row.total);
    }
    if let Some(seconds) = session.countdown().and_then(|timer| timer.remaining()) {
        println!("{seconds}s left");
    }
}

fn join(variants: &[Variant]) -> String {
    variants
        .iter()
        .map(Variant::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
