#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};
use std::string::String;
use std::vec::Vec;

use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::{Loc, Team};
use crate::config::piece_type_from_name;
use crate::game::Applied;
use crate::phase::Stage;
use crate::piece::PieceType;
use crate::protocol::{Message, PieceUpdate};
use crate::rules::{self, Source};

use super::Player;

pub struct CliPlayer;

impl CliPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `row,col`.
pub fn parse_loc(input: &str) -> Option<Loc> {
    let (r, c) = input.trim().split_once(',')?;
    let loc = Loc::new(r.trim().parse().ok()?, c.trim().parse().ok()?);
    loc.in_bounds().then_some(loc)
}

/// Parse `row,col row,col`.
pub fn parse_move(input: &str) -> Option<(Loc, Loc)> {
    let mut parts = input.split_whitespace();
    let from = parse_loc(parts.next()?)?;
    let to = parse_loc(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((from, to))
}

/// Prompt and read one trimmed line. `None` on end of input.
fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    if io::stdout().flush().is_err() {
        return None;
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn print_reserve(board: &Board, team: Team) {
    let mut counts: Vec<(PieceType, usize)> = Vec::new();
    for piece in board.reserve(team) {
        match counts.last_mut() {
            Some((kind, n)) if *kind == piece.kind() => *n += 1,
            _ => counts.push((piece.kind(), 1)),
        }
    }
    let listed: Vec<String> = counts
        .iter()
        .map(|(kind, n)| format!("{} x{}", kind, n))
        .collect();
    println!("Reserve: {}", listed.join(", "));
}

impl Player for CliPlayer {
    fn arrange(&mut self, board: &Board, team: Team, _rng: &mut SmallRng) -> Vec<(PieceType, Loc)> {
        println!("You are {}. Place pieces as `TYPE row,col` (e.g. SCOUT 9,0).", team);
        println!("Enter `done` to stop; anything left is placed at random when time runs out.");
        // Track our own picks so the prompt stays accurate without a model.
        let mut scratch = board.clone();
        let mut picks = Vec::new();
        loop {
            print!("{}", scratch.render(team));
            print_reserve(&scratch, team);
            if scratch.reserve_count(team) == 0 {
                break;
            }
            let Some(line) = prompt("place> ") else {
                break;
            };
            if line.is_empty() || line.eq_ignore_ascii_case("done") {
                break;
            }
            let mut parts = line.split_whitespace();
            let kind = parts.next().and_then(piece_type_from_name);
            let loc = parts.next().and_then(parse_loc);
            let (Some(kind), Some(loc)) = (kind, loc) else {
                println!("Invalid input");
                continue;
            };
            let free = rules::legal_moves(&scratch, Stage::Placement, Source::Reserve, team);
            if !free.contains(&loc) {
                println!("{} is not a free cell in your home rows", loc);
                continue;
            }
            match scratch.first_in_reserve(kind, team) {
                Some(id) => match scratch.set_piece(id, loc) {
                    Ok(()) => picks.push((kind, loc)),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("No {} left in reserve", kind),
            }
        }
        picks
    }

    fn choose_move(
        &mut self,
        board: &Board,
        team: Team,
        _rng: &mut SmallRng,
    ) -> Option<(Loc, Loc)> {
        loop {
            print!("{}", board.render(team));
            let line = prompt("move (row,col row,col or `resign`)> ")?;
            if line.eq_ignore_ascii_case("resign") {
                return None;
            }
            let Some((from, to)) = parse_move(&line) else {
                println!("Invalid move");
                continue;
            };
            if rules::legal_moves(board, Stage::Battle, Source::Board(from), team).contains(&to) {
                return Some((from, to));
            }
            println!("Illegal move {} -> {}", from, to);
        }
    }

    fn handle_remote(&mut self, applied: &Applied, board: &Board, team: Team) {
        match applied.message {
            Message::PieceUpdate(PieceUpdate::Move { from, to, .. }) => {
                println!("Opponent moved {} -> {}", from, to);
            }
            Message::PieceUpdate(PieceUpdate::Battle { winner, loser, tie }) => {
                if tie {
                    println!("Battle at {} and {}: both pieces fall", winner, loser);
                } else {
                    // An attacker that wins has already moved onto the loser's cell.
                    let name = board
                        .get(loser)
                        .or_else(|| board.get(winner))
                        .map(|p| p.kind().name())
                        .unwrap_or("piece");
                    println!("Battle: {} from {} beats the piece from {}", name, winner, loser);
                }
            }
            Message::BeginBattle(opponent) => println!("{} finished placement", opponent),
            Message::GameOver(winner) if winner == team => println!("You win!"),
            Message::GameOver(_) => println!("You lose."),
            _ => {}
        }
    }
}
