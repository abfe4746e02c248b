use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use stratego::play_local;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let game = play_local(
        SmallRng::seed_from_u64(seed1),
        SmallRng::seed_from_u64(seed2),
    )
    .await?;

    let winner = (game.red.winner == game.blue.winner).then(|| game.red.winner.to_string());
    let result = json!({
        "red": {"outcome": game.red, "won": game.red.won(), "moves": game.red_moves},
        "blue": {"outcome": game.blue, "won": game.blue.won(), "moves": game.blue_moves},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
