/// Integration tests for a full game driven through `Session`
///
/// These tests play sessions from lobby to finish, apply the deferred
/// transitions by hand, and check that every card stays accounted for.
use std::collections::HashSet;

use pyramid::{
    GameError, GameSettings, ServerMessage, Session,
    constants::DECK_SIZE,
    entities::{ChallengeReply, GameAction, Phase, PlayerId, SessionCode},
    game::{DeferredKind, Effects, recall::parse_recalled_cards},
};
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

fn lobby(n: usize) -> (Session, Vec<PlayerId>) {
    let ids: Vec<_> = (0..n).map(|_| Uuid::new_v4()).collect();
    let mut session = Session::new(
        SessionCode::new("GAME01"),
        ids[0],
        "player0",
        GameSettings::default(),
    );
    for (i, id) in ids.iter().enumerate().skip(1) {
        session.join(*id, format!("player{i}")).unwrap();
    }
    (session, ids)
}

fn assert_cards_partitioned(session: &Session) {
    let cards = session.cards_in_play();
    if session.phase() == Phase::Lobby {
        assert!(cards.is_empty());
        return;
    }
    assert_eq!(cards.len(), DECK_SIZE);
    let unique: HashSet<_> = cards.iter().collect();
    assert_eq!(unique.len(), DECK_SIZE);
}

/// Applies every deferred transition in `effects`, in order.
fn fire(session: &mut Session, effects: Effects) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    for deferred in effects.deferred {
        let fired = session.on_deferred(deferred);
        messages.extend(fired.outbound.into_iter().map(|out| out.message));
    }
    messages
}

fn recital_for(session: &Session, player: PlayerId) -> String {
    session
        .hand(player)
        .unwrap()
        .iter()
        .map(|card| card.rank.token())
        .collect::<Vec<_>>()
        .join(" ")
}

fn play_to_pyramid(session: &mut Session, host: PlayerId, rng: &mut StdRng) {
    session.start_game(host, rng).unwrap();
    assert_cards_partitioned(session);
    session.apply_action(host, GameAction::AutoStart, rng).unwrap();
    assert_cards_partitioned(session);
    let effects = session
        .apply_action(host, GameAction::StartMemorize, rng)
        .unwrap();
    assert_eq!(session.phase(), Phase::Memorize);
    fire(session, effects);
    assert_eq!(session.phase(), Phase::Pyramid);
}

#[test]
fn test_full_game_to_finish_and_restart() {
    let (mut session, ids) = lobby(4);
    let host = ids[0];
    let mut rng = StdRng::seed_from_u64(42);

    play_to_pyramid(&mut session, host, &mut rng);

    let mut recall_started = false;
    while session.phase() == Phase::Pyramid {
        let effects = session
            .apply_action(host, GameAction::FlipPyramidCard, &mut rng)
            .unwrap();
        assert_cards_partitioned(&session);
        let announced = fire(&mut session, effects);
        if session.phase() == Phase::Recall {
            recall_started = true;
            assert!(
                announced
                    .iter()
                    .any(|m| matches!(m, ServerMessage::BeginRecallTurn { player_index: 0 }))
            );
        }
    }
    assert!(recall_started);
    assert!(session.pyramid().iter().all(|slot| slot.revealed));

    // Odd seats recite correctly, even seats get it wrong.
    for (seat, id) in ids.iter().enumerate() {
        let recital = if seat % 2 == 1 {
            recital_for(&session, *id)
        } else {
            "nothing at all".to_string()
        };
        let effects = session.verify_recall(*id, *id, &recital).unwrap();
        let is_last = seat + 1 == ids.len();
        let kinds: Vec<_> = effects.deferred.iter().map(|d| d.kind).collect();
        if is_last {
            assert_eq!(kinds, vec![DeferredKind::FinishGame]);
        } else {
            assert_eq!(kinds, vec![DeferredKind::AnnounceRecallTurn { turn: seat + 1 }]);
        }
        fire(&mut session, effects);
    }

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.drink_count(ids[0]), Some(5));
    assert_eq!(session.drink_count(ids[1]), Some(0));
    assert_eq!(session.drink_count(ids[2]), Some(5));
    assert_eq!(session.drink_count(ids[3]), Some(0));

    session
        .apply_action(host, GameAction::RestartGame, &mut rng)
        .unwrap();
    assert_eq!(session.phase(), Phase::Setup);
    assert_eq!(session.flip_index(), 0);
    assert!(session.pyramid().is_empty());
    assert!(session.current_card().is_none());
    assert!(ids.iter().all(|id| session.drink_count(*id) == Some(0)));
    assert_cards_partitioned(&session);
}

#[test]
fn test_non_host_cannot_drive_game() {
    let (mut session, ids) = lobby(3);
    let mut rng = StdRng::seed_from_u64(1);
    session.start_game(ids[0], &mut rng).unwrap();
    assert_eq!(
        session
            .apply_action(ids[1], GameAction::AutoStart, &mut rng)
            .unwrap_err(),
        GameError::NotHost
    );
    assert_eq!(session.phase(), Phase::Setup);
}

#[test]
fn test_challenge_during_pyramid() {
    let (mut session, ids) = lobby(3);
    let host = ids[0];
    let mut rng = StdRng::seed_from_u64(9);
    play_to_pyramid(&mut session, host, &mut rng);

    assert_eq!(
        session.challenge(ids[1], ids[1], ids[2]).unwrap_err(),
        GameError::NoCardRevealed
    );

    session
        .apply_action(host, GameAction::FlipPyramidCard, &mut rng)
        .unwrap();
    let effects = session.challenge(ids[1], ids[1], ids[2]).unwrap();
    assert!(effects.messages_for(ids[0]).is_empty());
    assert!(matches!(
        effects.messages_for(ids[2])[..],
        [ServerMessage::ChallengeReceived { .. }]
    ));

    session
        .respond_to_challenge(ids[2], ChallengeReply::Challenge)
        .unwrap();
    let rank = session.current_card().unwrap().rank;
    let holds = session
        .hand(ids[1])
        .unwrap()
        .iter()
        .any(|card| card.rank == rank);
    session.prove_card(ids[1], rank, true).unwrap();

    if holds {
        assert_eq!(session.drink_count(ids[2]), Some(2));
        assert_eq!(session.drink_count(ids[1]), Some(0));
    } else {
        assert_eq!(session.drink_count(ids[1]), Some(1));
        assert_eq!(session.drink_count(ids[2]), Some(0));
    }
    assert!(session.active_challenge().is_none());
}

#[test]
fn test_restart_drops_pending_finish() {
    let (mut session, ids) = lobby(3);
    let host = ids[0];
    let mut rng = StdRng::seed_from_u64(5);
    play_to_pyramid(&mut session, host, &mut rng);
    while session.phase() == Phase::Pyramid {
        session
            .apply_action(host, GameAction::FlipPyramidCard, &mut rng)
            .unwrap();
    }

    let mut finish = None;
    for id in &ids {
        let effects = session.verify_recall(*id, *id, "A").unwrap();
        finish = effects.deferred.last().copied();
    }
    let finish = finish.unwrap();
    assert_eq!(finish.kind, DeferredKind::FinishGame);

    // The host resets the recital order before the finish timer fires.
    session
        .apply_action(host, GameAction::StartRecall, &mut rng)
        .unwrap();
    assert!(session.on_deferred(finish).is_empty());
    assert_eq!(session.phase(), Phase::Recall);
    assert_eq!(session.recall_turn_index(), 0);
}

#[test]
fn test_departures_keep_cards_accounted_for() {
    let (mut session, ids) = lobby(5);
    let mut rng = StdRng::seed_from_u64(11);
    play_to_pyramid(&mut session, ids[0], &mut rng);

    session.remove_player(ids[0]).unwrap();
    session.remove_player(ids[3]).unwrap();

    assert_eq!(session.host_id(), ids[1]);
    assert_eq!(session.players().len(), 3);
    assert_cards_partitioned(&session);
    let view = session.view();
    assert!(!view.player_hands.contains_key(&ids[0]));
    assert_eq!(view.player_hands.len(), 3);
}

#[test]
fn test_recital_words_match_tokens() {
    let (mut session, ids) = lobby(3);
    let mut rng = StdRng::seed_from_u64(2);
    session.start_game(ids[0], &mut rng).unwrap();
    session
        .apply_action(ids[0], GameAction::AutoStart, &mut rng)
        .unwrap();
    let recital = recital_for(&session, ids[0]);
    assert_eq!(parse_recalled_cards(&recital).len(), 4);
}
