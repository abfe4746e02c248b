use std::sync::{Arc, Mutex};

use stratego::{
    apply, Applied, ApplyError, Board, BoardError, GameModel, GameState, Loc, Message, Origin,
    Phase, PieceId, PieceType, PieceUpdate, Team, TurnCoordinator,
};

fn id(kind: PieceType, team: Team) -> PieceId {
    PieceId::new(kind, team, 0)
}

fn battle_state(turn: Team, pieces: &[(PieceType, Team, i8, i8)]) -> GameState {
    let mut board = Board::new();
    let mut next = std::collections::BTreeMap::new();
    for &(kind, team, r, c) in pieces {
        let n = next.entry((kind, team)).or_insert(0u8);
        board
            .set_piece(PieceId::new(kind, team, *n), Loc::new(r, c))
            .unwrap();
        *n += 1;
    }
    GameState {
        board,
        phase: Phase::Battle { turn },
    }
}

fn placement_state() -> GameState {
    GameState {
        board: Board::new(),
        phase: Phase::open_placement(),
    }
}

fn place(kind: PieceType, team: Team, r: i8, c: i8) -> Message {
    Message::PieceUpdate(PieceUpdate::Placement {
        to: Loc::new(r, c),
        kind,
        team,
    })
}

#[test]
fn miner_defuses_bomb() {
    let state = battle_state(
        Team::Blue,
        &[
            (PieceType::Miner, Team::Blue, 0, 0),
            (PieceType::Flag, Team::Blue, 1, 9),
            (PieceType::Bomb, Team::Red, 0, 1),
            (PieceType::Flag, Team::Red, 9, 9),
            (PieceType::Scout, Team::Red, 9, 8),
        ],
    );
    let mut blue = TurnCoordinator::new(GameModel::from_state(state), Team::Blue, 0);

    let applied = blue.move_piece(Loc::new(0, 0), Loc::new(0, 1)).unwrap();
    let messages: Vec<Message> = applied.iter().map(|a| a.message).collect();
    assert_eq!(
        messages,
        vec![
            Message::PieceUpdate(PieceUpdate::Battle {
                winner: Loc::new(0, 0),
                loser: Loc::new(0, 1),
                tie: false,
            }),
            Message::EndOfTurn(Team::Red),
        ]
    );
    assert!(applied.iter().all(Applied::should_relay));

    let board = blue.board();
    let miner = board.piece(id(PieceType::Miner, Team::Blue)).unwrap();
    let bomb = board.piece(id(PieceType::Bomb, Team::Red)).unwrap();
    assert_eq!(miner.location(), Some(Loc::new(0, 1)));
    assert!(bomb.is_captured());
    assert!(miner.revealed() && bomb.revealed());
    assert_eq!(blue.phase(), Phase::Battle { turn: Team::Red });
}

#[test]
fn defender_that_wins_stays_put() {
    let mut state = battle_state(
        Team::Red,
        &[
            (PieceType::Scout, Team::Red, 6, 0),
            (PieceType::Flag, Team::Red, 9, 0),
            (PieceType::General, Team::Blue, 3, 0),
            (PieceType::Flag, Team::Blue, 0, 0),
        ],
    );
    let battle = Message::PieceUpdate(PieceUpdate::Battle {
        winner: Loc::new(3, 0),
        loser: Loc::new(6, 0),
        tie: false,
    });
    apply(&mut state, &battle).unwrap();
    assert_eq!(
        state.board.get(Loc::new(3, 0)).map(|p| p.kind()),
        Some(PieceType::General)
    );
    assert!(!state.board.has_piece(Loc::new(6, 0)));
}

#[test]
fn tie_captures_both() {
    let mut state = battle_state(
        Team::Red,
        &[
            (PieceType::Major, Team::Red, 5, 0),
            (PieceType::Major, Team::Blue, 4, 0),
        ],
    );
    let battle = Message::PieceUpdate(PieceUpdate::Battle {
        winner: Loc::new(5, 0),
        loser: Loc::new(4, 0),
        tie: true,
    });
    apply(&mut state, &battle).unwrap();
    assert!(!state.board.has_piece(Loc::new(5, 0)));
    assert!(!state.board.has_piece(Loc::new(4, 0)));
}

#[test]
fn inconsistent_battle_is_rejected() {
    let mut state = battle_state(
        Team::Red,
        &[
            (PieceType::Scout, Team::Red, 5, 0),
            (PieceType::Marshall, Team::Blue, 4, 0),
        ],
    );
    let before = state.clone();
    let battle = Message::PieceUpdate(PieceUpdate::Battle {
        winner: Loc::new(5, 0),
        loser: Loc::new(4, 0),
        tie: false,
    });
    assert_eq!(apply(&mut state, &battle), Err(ApplyError::BattleMismatch));
    assert_eq!(state, before);
}

#[test]
fn duplicate_messages_change_nothing() {
    let mut state = placement_state();
    let msg = place(PieceType::Flag, Team::Red, 9, 0);
    apply(&mut state, &msg).unwrap();
    let after_first = state.clone();
    assert_eq!(
        apply(&mut state, &msg),
        Err(ApplyError::Board(BoardError::NotInReserve))
    );
    assert_eq!(state, after_first);

    let mv = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(9, 0),
        to: Loc::new(8, 0),
        team: Team::Red,
    });
    apply(&mut state, &mv).unwrap();
    let after_move = state.clone();
    assert!(apply(&mut state, &mv).is_err());
    assert_eq!(state, after_move);

    let mut battle = battle_state(
        Team::Red,
        &[
            (PieceType::Colonel, Team::Red, 5, 0),
            (PieceType::Flag, Team::Red, 9, 0),
            (PieceType::Captain, Team::Blue, 4, 0),
            (PieceType::Flag, Team::Blue, 0, 0),
        ],
    );
    let fight = Message::PieceUpdate(PieceUpdate::Battle {
        winner: Loc::new(5, 0),
        loser: Loc::new(4, 0),
        tie: false,
    });
    let turn = Message::EndOfTurn(Team::Blue);
    let over = Message::GameOver(Team::Red);
    for msg in [fight, turn, over] {
        apply(&mut battle, &msg).unwrap();
        let snapshot = battle.clone();
        assert!(apply(&mut battle, &msg).is_err(), "{} applied twice", msg);
        assert_eq!(battle, snapshot);
    }
}

#[test]
fn placement_outside_home_rows_is_rejected() {
    let mut state = placement_state();
    assert_eq!(
        apply(&mut state, &place(PieceType::Spy, Team::Red, 3, 0)),
        Err(ApplyError::OutsideHomeRows(Loc::new(3, 0)))
    );
    assert_eq!(state, placement_state());
}

#[test]
fn placement_move_onto_own_piece_swaps() {
    let mut state = placement_state();
    apply(&mut state, &place(PieceType::Flag, Team::Blue, 0, 0)).unwrap();
    apply(&mut state, &place(PieceType::Bomb, Team::Blue, 0, 1)).unwrap();
    let swap = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(0, 0),
        to: Loc::new(0, 1),
        team: Team::Blue,
    });
    apply(&mut state, &swap).unwrap();
    assert_eq!(
        state.board.get(Loc::new(0, 1)).map(|p| p.kind()),
        Some(PieceType::Flag)
    );
    assert_eq!(
        state.board.get(Loc::new(0, 0)).map(|p| p.kind()),
        Some(PieceType::Bomb)
    );
}

#[test]
fn remove_returns_to_reserve_and_is_refused_in_battle() {
    let mut state = placement_state();
    apply(&mut state, &place(PieceType::Scout, Team::Red, 7, 3)).unwrap();
    let remove = Message::PieceUpdate(PieceUpdate::Remove {
        from: Loc::new(7, 3),
    });
    apply(&mut state, &remove).unwrap();
    assert_eq!(state.board.reserve_count(Team::Red), 40);

    let mut battle = battle_state(Team::Red, &[(PieceType::Scout, Team::Red, 7, 3)]);
    let before = battle.clone();
    assert!(matches!(
        apply(&mut battle, &remove),
        Err(ApplyError::WrongPhase(Phase::Battle { .. }))
    ));
    assert_eq!(battle, before);
}

#[test]
fn phase_mismatched_messages_are_rejected() {
    let mut state = GameState::default();
    assert!(matches!(
        apply(&mut state, &place(PieceType::Flag, Team::Red, 9, 0)),
        Err(ApplyError::WrongPhase(Phase::Connecting))
    ));
    assert!(apply(&mut state, &Message::EndOfTurn(Team::Blue)).is_err());

    let mut battle = battle_state(Team::Red, &[]);
    assert!(matches!(
        apply(&mut battle, &place(PieceType::Flag, Team::Red, 9, 0)),
        Err(ApplyError::WrongPhase(_))
    ));
}

#[test]
fn moves_out_of_turn_are_rejected() {
    let mut state = battle_state(
        Team::Red,
        &[
            (PieceType::Scout, Team::Blue, 3, 0),
            (PieceType::Scout, Team::Red, 6, 0),
        ],
    );
    let mv = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(3, 0),
        to: Loc::new(4, 0),
        team: Team::Blue,
    });
    assert_eq!(apply(&mut state, &mv), Err(ApplyError::NotYourTurn(Team::Blue)));

    let diagonal = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(6, 0),
        to: Loc::new(5, 1),
        team: Team::Red,
    });
    assert!(matches!(
        apply(&mut state, &diagonal),
        Err(ApplyError::IllegalMove { .. })
    ));
}

#[test]
fn battle_starts_once_both_teams_are_ready() {
    let mut red = TurnCoordinator::new(GameModel::new(), Team::Red, 0);
    red.start_placement().unwrap();
    let mut model = GameModel::new();
    model.process_update(Message::BeginPlacement, Origin::Local).unwrap();

    let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(7);
    for a in red.auto_place(&mut rng).unwrap() {
        model.process_update(a.message, Origin::Remote).unwrap();
    }
    model
        .process_update(Message::BeginBattle(Team::Red), Origin::Remote)
        .unwrap();
    assert!(model.phase().is_ready(Team::Red));
    assert!(!model.phase().is_ready(Team::Blue));
    assert_eq!(
        model.process_update(Message::BeginBattle(Team::Red), Origin::Remote),
        Err(ApplyError::Duplicate)
    );

    let blue_kinds: Vec<PieceType> = model.board().reserve(Team::Blue).map(|p| p.kind()).collect();
    let cells = stratego::rules::home_cells(Team::Blue);
    for (kind, loc) in blue_kinds.into_iter().zip(cells) {
        let msg = Message::PieceUpdate(PieceUpdate::Placement {
            to: loc,
            kind,
            team: Team::Blue,
        });
        model.process_update(msg, Origin::Local).unwrap();
    }
    // Blue has placed everything but may still rearrange.
    assert!(model.phase().is_placement());
    let swap = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(0, 0),
        to: Loc::new(0, 1),
        team: Team::Blue,
    });
    model.process_update(swap, Origin::Local).unwrap();
    assert!(model.phase().is_placement());

    model
        .process_update(Message::BeginBattle(Team::Blue), Origin::Local)
        .unwrap();
    assert_eq!(model.phase(), Phase::Battle { turn: Team::Red });
}

#[test]
fn ready_team_can_no_longer_edit() {
    let mut state = placement_state();
    apply(&mut state, &place(PieceType::Flag, Team::Red, 9, 0)).unwrap();
    apply(&mut state, &place(PieceType::Flag, Team::Blue, 0, 0)).unwrap();
    apply(&mut state, &Message::BeginBattle(Team::Red)).unwrap();
    let before = state.clone();

    let late_place = place(PieceType::Spy, Team::Red, 9, 1);
    let late_move = Message::PieceUpdate(PieceUpdate::Move {
        from: Loc::new(9, 0),
        to: Loc::new(8, 0),
        team: Team::Red,
    });
    let late_remove = Message::PieceUpdate(PieceUpdate::Remove {
        from: Loc::new(9, 0),
    });
    for msg in [late_place, late_move, late_remove] {
        assert!(matches!(apply(&mut state, &msg), Err(ApplyError::WrongPhase(_))));
        assert_eq!(state, before);
    }

    // The team that is not ready yet still arranges freely.
    let blue_remove = Message::PieceUpdate(PieceUpdate::Remove {
        from: Loc::new(0, 0),
    });
    apply(&mut state, &blue_remove).unwrap();
    assert_eq!(state.board.reserve_count(Team::Blue), 40);
}

#[test]
fn is_game_over_cases() {
    let empty = GameModel::new();
    assert!(empty.is_game_over(Team::Blue));

    let stuck = GameModel::from_state(battle_state(
        Team::Red,
        &[
            (PieceType::Flag, Team::Blue, 0, 0),
            (PieceType::Bomb, Team::Blue, 0, 1),
            (PieceType::Bomb, Team::Blue, 1, 0),
        ],
    ));
    assert!(stuck.is_game_over(Team::Blue));

    let alive = GameModel::from_state(battle_state(
        Team::Red,
        &[
            (PieceType::Flag, Team::Blue, 0, 0),
            (PieceType::Lieutenant, Team::Blue, 2, 5),
        ],
    ));
    assert!(!alive.is_game_over(Team::Blue));
}

#[test]
fn subscribers_see_every_accepted_change_with_origin() {
    let seen: Arc<Mutex<Vec<Applied>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut model = GameModel::new();
    model.subscribe(move |a| sink.lock().unwrap().push(*a));

    model.process_update(Message::BeginPlacement, Origin::Local).unwrap();
    model
        .process_update(place(PieceType::Spy, Team::Blue, 2, 2), Origin::Remote)
        .unwrap();
    assert!(model
        .process_update(place(PieceType::Spy, Team::Blue, 2, 3), Origin::Remote)
        .is_err());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(!seen[0].should_relay());
    assert_eq!(seen[1].origin, Origin::Remote);
    assert!(!seen[1].should_relay());
}

#[test]
fn identical_message_streams_converge() {
    let messages = vec![
        Message::BeginPlacement,
        place(PieceType::Flag, Team::Red, 9, 0),
        place(PieceType::Scout, Team::Red, 6, 0),
        place(PieceType::Flag, Team::Blue, 0, 9),
        place(PieceType::Scout, Team::Blue, 3, 0),
        Message::PieceUpdate(PieceUpdate::Move {
            from: Loc::new(9, 0),
            to: Loc::new(6, 0),
            team: Team::Red,
        }),
        Message::PieceUpdate(PieceUpdate::Remove {
            from: Loc::new(3, 0),
        }),
        place(PieceType::Scout, Team::Blue, 3, 4),
    ];
    let mut a = GameModel::new();
    let mut b = GameModel::new();
    for msg in &messages {
        let ra = a.process_update(*msg, Origin::Local).map(|x| x.message);
        let rb = b.process_update(*msg, Origin::Remote).map(|x| x.message);
        assert_eq!(ra, rb);
    }
    assert_eq!(a.state(), b.state());
}
