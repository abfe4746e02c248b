use stratego::{
    Kind, Loc, Message, Packet, PieceType, PieceUpdate, ProtocolError, Team, WireRecord,
};

fn record(kind: Kind) -> WireRecord {
    WireRecord {
        kind,
        team: Team::Blue,
        from: None,
        to: None,
        piece_type: None,
        tie: None,
    }
}

#[test]
fn piece_update_kind_is_inferred_from_fields() {
    let placement = WireRecord {
        to: Some(Loc::new(0, 3)),
        piece_type: Some(PieceType::Spy),
        ..record(Kind::PieceUpdate)
    };
    assert_eq!(
        Message::try_from(placement),
        Ok(Message::PieceUpdate(PieceUpdate::Placement {
            to: Loc::new(0, 3),
            kind: PieceType::Spy,
            team: Team::Blue,
        }))
    );

    let battle = WireRecord {
        from: Some(Loc::new(4, 0)),
        to: Some(Loc::new(5, 0)),
        tie: Some(false),
        ..record(Kind::PieceUpdate)
    };
    assert!(matches!(
        Message::try_from(battle),
        Ok(Message::PieceUpdate(PieceUpdate::Battle { tie: false, .. }))
    ));

    let mv = WireRecord {
        from: Some(Loc::new(3, 0)),
        to: Some(Loc::new(4, 0)),
        ..record(Kind::PieceUpdate)
    };
    assert!(matches!(
        Message::try_from(mv),
        Ok(Message::PieceUpdate(PieceUpdate::Move { team: Team::Blue, .. }))
    ));

    let remove = WireRecord {
        from: Some(Loc::new(3, 0)),
        ..record(Kind::PieceUpdate)
    };
    assert_eq!(
        Message::try_from(remove),
        Ok(Message::PieceUpdate(PieceUpdate::Remove {
            from: Loc::new(3, 0)
        }))
    );
}

#[test]
fn malformed_piece_updates_are_rejected() {
    let empty = record(Kind::PieceUpdate);
    assert_eq!(
        Message::try_from(empty),
        Err(ProtocolError::Malformed(Kind::PieceUpdate))
    );
    let overfull = WireRecord {
        from: Some(Loc::new(3, 0)),
        to: Some(Loc::new(4, 0)),
        piece_type: Some(PieceType::Scout),
        ..record(Kind::PieceUpdate)
    };
    assert!(Message::try_from(overfull).is_err());
    let tie_without_target = WireRecord {
        from: Some(Loc::new(3, 0)),
        tie: Some(true),
        ..record(Kind::PieceUpdate)
    };
    assert!(Message::try_from(tie_without_target).is_err());
}

#[test]
fn phase_messages_carry_the_team() {
    assert_eq!(
        Message::try_from(record(Kind::BeginGame)),
        Ok(Message::BeginBattle(Team::Blue))
    );
    assert_eq!(
        Message::try_from(record(Kind::EndOfTurn)),
        Ok(Message::EndOfTurn(Team::Blue))
    );
    assert_eq!(
        Message::try_from(record(Kind::GameOver)),
        Ok(Message::GameOver(Team::Blue))
    );
    assert_eq!(
        Message::try_from(record(Kind::BeginPlacement)),
        Ok(Message::BeginPlacement)
    );
}

#[test]
fn only_begin_placement_stays_local() {
    assert!(!Message::BeginPlacement.is_replicated());
    assert!(Message::BeginBattle(Team::Red).is_replicated());
    assert!(Message::EndOfTurn(Team::Red).is_replicated());
    assert!(Message::PieceUpdate(PieceUpdate::Remove {
        from: Loc::new(0, 0)
    })
    .is_replicated());
}

#[test]
fn packets_survive_bincode() {
    let messages = [
        Message::BeginBattle(Team::Red),
        Message::PieceUpdate(PieceUpdate::Battle {
            winner: Loc::new(4, 4),
            loser: Loc::new(3, 4),
            tie: true,
        }),
        Message::PieceUpdate(PieceUpdate::Move {
            from: Loc::new(9, 9),
            to: Loc::new(5, 9),
            team: Team::Red,
        }),
    ];
    for msg in messages {
        let packet = Packet::from(&msg);
        let bytes = bincode::serialize(&packet).unwrap();
        let decoded: Packet = bincode::deserialize(&bytes).unwrap();
        let Packet::Record(rec) = decoded else {
            panic!("expected a record, got {:?}", decoded);
        };
        assert_eq!(Message::try_from(rec), Ok(msg));
    }
}
