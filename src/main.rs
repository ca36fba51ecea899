//! # Parlor Demo Driver
//!
//! Plays one scripted match against the bot through the full engine stack
//! (registry, per-session locking, delayed bot turns, settlement) and prints
//! the result. The "human" seat is driven by the same heuristics as the bot,
//! so the binary doubles as a quick end-to-end smoke run:
//!
//! ```text
//! cargo run -- --game othello --size 8
//! RUST_LOG=debug cargo run -- --game connect4
//! ```

use clap::Parser;
use colored::Colorize;
use parlor::games::othello::BoardSize;
use parlor::ledger::MemoryLedger;
use parlor::registry::{GameRequest, RegistryConfig, SessionRegistry};
use parlor::scheduler::ThinkDelay;
use parlor::session::{MoveResult, ParticipantId, RejectReason};
use parlor::{bot, GameState, GameWrapper};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "play", about = "Run a scripted match against the bot")]
struct Args {
    /// Game to play: othello, connect4, janken, highlow
    #[arg(short, long, default_value = "othello")]
    game: String,
    /// Othello board size (6, 8, or 10)
    #[arg(short, long, default_value_t = 8)]
    size: usize,
    /// High-low stake
    #[arg(short, long, default_value_t = 100)]
    bet: i64,
    /// Seed for reproducible high-low draws
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_request(args: &Args) -> Result<GameRequest, String> {
    match args.game.as_str() {
        "othello" => {
            let size = BoardSize::from_cells(args.size)
                .ok_or_else(|| format!("invalid board size {} (use 6, 8 or 10)", args.size))?;
            Ok(GameRequest::Othello { size })
        }
        "connect4" => Ok(GameRequest::Connect4),
        "janken" => Ok(GameRequest::Janken),
        "highlow" => Ok(GameRequest::HighLow { bet: args.bet }),
        other => Err(format!("unknown game '{}'", other)),
    }
}

fn print_state(state: &GameWrapper) {
    match state {
        GameWrapper::Othello(game) => println!("{}", game),
        GameWrapper::Connect4(game) => println!("{}", game),
        GameWrapper::Janken(round) => {
            if let Some(outcome) = round.outcome() {
                println!("judged: {:?}", outcome);
            }
        }
        GameWrapper::HighLow(round) => {
            print!("face-up card: {}", round.current_card());
            match round.drawn_card() {
                Some(card) => println!(", drawn: {}", card),
                None => println!(),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let request = match parse_request(&args) {
        Ok(request) => request,
        Err(message) => {
            eprintln!("{} {}", "error:".red().bold(), message);
            return ExitCode::FAILURE;
        }
    };

    let ledger = Arc::new(MemoryLedger::new());
    let config = RegistryConfig {
        think_delay: ThinkDelay {
            min_ms: 100,
            max_ms: 400,
        },
        ..Default::default()
    };
    let registry = SessionRegistry::new(ledger.clone(), config);
    let me = ParticipantId::human("demo");
    let id = registry.create_session(request, "demo", ParticipantId::Bot, args.seed);
    println!("{} {}", "session".bold(), id);

    loop {
        let view = match registry.view(id).await {
            Some(view) => view,
            // Finished sessions are settled and removed by the registry.
            None => break,
        };
        if view.lifecycle.is_finished() {
            break;
        }
        if view.state.get_current_player() != 1 {
            // Bot's turn; its scheduled task will take it.
            tokio::time::sleep(Duration::from_millis(50)).await;
            continue;
        }

        let mv = match bot::choose_move(&view.state, &mut rand::thread_rng()) {
            Some(mv) => mv,
            None => break,
        };
        match registry.submit_move(id, &me, mv.clone()).await {
            MoveResult::Applied { game_over, winner, .. } => {
                println!("{} {}", "demo plays".cyan(), mv);
                if let Some(after) = registry.view(id).await {
                    print_state(&after.state);
                }
                if game_over {
                    match winner {
                        Some(1) => println!("{}", "demo wins".green().bold()),
                        Some(_) => println!("{}", "bot wins".yellow().bold()),
                        None => println!("{}", "draw".bold()),
                    }
                }
            }
            MoveResult::Rejected { reason } => match reason {
                RejectReason::MutationInFlight | RejectReason::NotYourTurn => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                _ => break,
            },
        }
    }

    println!("{}", "final balances".bold());
    for (name, balance) in ledger.balances().await {
        let formatted = format!("{:+}", balance);
        let colored_balance = if balance >= 0 {
            formatted.green()
        } else {
            formatted.red()
        };
        println!("  {}: {}", name, colored_balance);
    }
    ExitCode::SUCCESS
}
