#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use stratego::{
    connection, init_logging, play_local, CliPlayer, Player, PlayerNode, RandomPlayer, Role,
    SessionConfig, DEFAULT_PORT, PLACEMENT_PHASE_SECS,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Two AI players on the local machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Host a game as RED and wait for an opponent to connect.
    Host {
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = PLACEMENT_PHASE_SECS)]
        placement_secs: u32,
        #[arg(long, default_value_t = 0, help = "Pause in milliseconds after the handshake")]
        start_delay_ms: u64,
    },
    /// Join a hosted game as BLUE.
    Join {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = PLACEMENT_PHASE_SECS)]
        placement_secs: u32,
        #[arg(long, default_value_t = 0, help = "Pause in milliseconds after the handshake")]
        start_delay_ms: u64,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn make_player(kind: PlayerType) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new()),
        PlayerType::Ai => Box::new(RandomPlayer::new()),
    }
}

#[cfg(feature = "std")]
async fn play_networked(
    config: SessionConfig,
    player: PlayerType,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut rng = make_rng(seed);
    let transport = connection::establish(&config).await?;
    let mut node = PlayerNode::with_config(make_player(player), &config, Box::new(transport));
    let outcome = node.run(&mut rng).await?;
    if outcome.won() {
        println!("{} wins. You won!", outcome.winner);
    } else {
        println!("{} wins. You lost.", outcome.winner);
    }
    Ok(())
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => {
            println!("Starting local AI vs AI game...");
            let red_rng = make_rng(seed);
            let blue_rng = make_rng(seed.map(|s| s.wrapping_add(1)));
            let game = play_local(red_rng, blue_rng).await?;
            println!(
                "{} wins after {} RED and {} BLUE moves",
                game.red.winner, game.red_moves, game.blue_moves
            );
        }
        Commands::Host {
            bind,
            port,
            player,
            seed,
            placement_secs,
            start_delay_ms,
        } => {
            let config = SessionConfig {
                host: bind,
                port,
                role: Role::Listener,
                placement_secs,
                start_delay: Duration::from_millis(start_delay_ms),
            };
            println!("Hosting on {}...", config.addr());
            play_networked(config, player, seed).await?;
        }
        Commands::Join {
            host,
            port,
            player,
            seed,
            placement_secs,
            start_delay_ms,
        } => {
            let config = SessionConfig {
                host,
                port,
                role: Role::Initiator,
                placement_secs,
                start_delay: Duration::from_millis(start_delay_ms),
            };
            println!("Joining {}...", config.addr());
            play_networked(config, player, seed).await?;
        }
    }
    Ok(())
}
