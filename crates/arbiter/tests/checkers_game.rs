//! End-to-end flows: the arbiter adjudicating real checkers games.

use alloy_primitives::{keccak256, Address, Bytes, U256};
use gamejutsu_arbiter::{Arbiter, MockHost, MoveSigner, DEFAULT_TIMEOUT_STAKE, TIMEOUT_DURATION};
use gamejutsu_checkers::{CheckersRules, Move, State, EMPTY, RED_MAN, WHITE_MAN};
use gamejutsu_primitives::{ArbiterError, ArbiterEvent, GameId, GameMove, GameState, Rules, SignedGameMove};
use k256::ecdsa::SigningKey;
use std::sync::Arc;

struct Player {
    key: SigningKey,
    addr: Address,
}

fn player(seed: u8) -> Player {
    let key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let pubkey = key.verifying_key().to_encoded_point(false);
    let addr = Address::from_slice(&keccak256(&pubkey.as_bytes()[1..])[12..]);
    Player { key, addr }
}

fn sign(signer: &MoveSigner, key: &SigningKey, game_move: &GameMove) -> Bytes {
    let digest = signer.digest(game_move);
    let (sig, recovery_id) = key.sign_prehash_recoverable(digest.as_slice()).unwrap();
    let mut out = sig.to_bytes().to_vec();
    out.push(27 + recovery_id.to_byte());
    out.into()
}

fn step(from: u8, to: u8) -> Move {
    Move {
        from,
        to,
        is_jump: false,
        pass_to_opponent: true,
    }
}

fn jump(from: u8, to: u8) -> Move {
    Move {
        from,
        to,
        is_jump: true,
        pass_to_opponent: true,
    }
}

/// Builds the [GameMove] asserting `mv` played by `player` from `old`, with the new
/// state taken from the rules module's own transition.
fn play(
    game_id: GameId,
    nonce: u64,
    player: Address,
    player_id: u8,
    old: &Bytes,
    mv: &Move,
) -> GameMove {
    let rules = CheckersRules;
    let state = GameState::new(game_id, nonce, old.clone());
    let mv_bytes = mv.encode();
    assert!(
        rules.is_valid_move(&state, player_id, &mv_bytes).unwrap(),
        "test move {:?} is illegal",
        mv
    );
    let next = rules.transition(&state, player_id, &mv_bytes).unwrap();
    GameMove {
        game_id,
        nonce,
        player,
        old_state: old.clone(),
        new_state: next.state,
        mv: mv_bytes,
    }
}

fn setup() -> (Arbiter<MockHost>, Player, Player, GameId) {
    let mut arbiter = Arbiter::new(MockHost::new());
    let white = player(0x11);
    let red = player(0x22);
    let game_id = arbiter
        .propose_game(white.addr, U256::from(100), Arc::new(CheckersRules), &[])
        .unwrap();
    arbiter
        .accept_game(red.addr, U256::from(100), game_id, &[])
        .unwrap();
    (arbiter, white, red, game_id)
}

/// The opening exchange 9→14, 22→18, checkpoint co-signed and reply mover-signed.
fn opening_pair(
    signer: &MoveSigner,
    white: &Player,
    red: &Player,
    game_id: GameId,
) -> [SignedGameMove; 2] {
    let initial = CheckersRules.default_initial_state();
    let first = play(game_id, 0, white.addr, 0, &initial, &step(9, 14));
    let last = play(game_id, 1, red.addr, 1, &first.new_state, &step(22, 18));
    [
        SignedGameMove::new(
            first.clone(),
            vec![sign(signer, &white.key, &first), sign(signer, &red.key, &first)],
        ),
        SignedGameMove::new(last.clone(), vec![sign(signer, &red.key, &last)]),
    ]
}

fn board(pieces: &[(u8, u8)], red_moves: bool) -> Bytes {
    let mut cells = [EMPTY; 32];
    for &(sq, piece) in pieces {
        cells[sq as usize - 1] = piece;
    }
    State {
        cells,
        red_moves,
        winner: 0,
    }
    .encode()
}

#[test]
fn finish_by_capturing_the_last_red_piece() {
    let (mut arbiter, white, red, game_id) = setup();
    let signer = arbiter.signer().clone();

    // Red walks 22→18 into range; white jumps 14 over 18, taking red's last piece.
    let endgame = board(&[(14, WHITE_MAN), (22, RED_MAN)], true);
    let first = play(game_id, 6, red.addr, 1, &endgame, &step(22, 18));
    let last = play(game_id, 7, white.addr, 0, &first.new_state, &jump(14, 23));

    let moves = [
        SignedGameMove::new(
            first.clone(),
            vec![sign(&signer, &red.key, &first), sign(&signer, &white.key, &first)],
        ),
        SignedGameMove::new(last.clone(), vec![sign(&signer, &white.key, &last)]),
    ];
    arbiter.finish_game(&moves).unwrap();

    assert!(arbiter.game(game_id).unwrap().finished());
    assert_eq!(arbiter.host().credited(white.addr), U256::from(200));
    assert_eq!(arbiter.host().credited(red.addr), U256::ZERO);
    assert!(matches!(
        arbiter.host().events.last().unwrap(),
        ArbiterEvent::GameFinished { winner, loser, is_draw: false, .. }
            if *winner == white.addr && *loser == red.addr
    ));
}

#[test]
fn finishing_mid_game_is_rejected() {
    let (mut arbiter, white, red, game_id) = setup();
    let signer = arbiter.signer().clone();
    let moves = opening_pair(&signer, &white, &red, game_id);
    assert_eq!(arbiter.finish_game(&moves), Err(ArbiterError::NotFinal));
}

#[test]
fn dispute_a_move_of_the_opponents_piece() {
    let (mut arbiter, white, red, game_id) = setup();
    let signer = arbiter.signer().clone();

    let initial = CheckersRules.default_initial_state();
    let first = play(game_id, 0, white.addr, 0, &initial, &step(9, 14));

    // Red signs a move pushing *white's* man on 14. The rules module rejects it,
    // so white disputes and takes the pot.
    let cheat_state = GameState::new(game_id, 1, first.new_state.clone());
    let cheat_mv = step(14, 18).encode();
    assert!(!CheckersRules
        .is_valid_move(&cheat_state, 1, &cheat_mv)
        .unwrap());
    let forged_next = board(&[(18, WHITE_MAN)], false);
    let cheat = GameMove {
        game_id,
        nonce: 1,
        player: red.addr,
        old_state: first.new_state.clone(),
        new_state: forged_next,
        mv: cheat_mv,
    };
    let signed = SignedGameMove::new(cheat.clone(), vec![sign(&signer, &red.key, &cheat)]);

    arbiter.dispute_move(&signed).unwrap();
    assert_eq!(arbiter.host().credited(white.addr), U256::from(200));
    assert!(matches!(
        arbiter.host().events[arbiter.host().events.len() - 2],
        ArbiterEvent::PlayerDisqualified { player, .. } if player == red.addr
    ));
}

#[test]
fn timeout_resolved_by_the_demanded_jump() {
    let (mut arbiter, white, red, game_id) = setup();
    let signer = arbiter.signer().clone();
    let moves = opening_pair(&signer, &white, &red, game_id);

    // Red claims white is stalling after the 22→18 reply.
    arbiter
        .init_timeout(red.addr, DEFAULT_TIMEOUT_STAKE, &moves)
        .unwrap();
    assert!(matches!(
        arbiter.host().events.last().unwrap(),
        ArbiterEvent::TimeoutStarted { player, nonce: 2, .. } if *player == white.addr
    ));

    // White answers in time with the capture 14 over 18, landing on 23.
    let answer = play(
        game_id,
        2,
        white.addr,
        0,
        &moves[1].game_move.new_state,
        &jump(14, 23),
    );
    let signed = SignedGameMove::new(answer.clone(), vec![sign(&signer, &white.key, &answer)]);
    arbiter.host_mut().advance(TIMEOUT_DURATION / 2);
    arbiter.resolve_timeout(&signed).unwrap();

    // Bond returned; the game itself continues.
    assert_eq!(arbiter.host().credited(red.addr), DEFAULT_TIMEOUT_STAKE);
    assert!(arbiter.timeout(game_id).is_none());
    assert!(!arbiter.game(game_id).unwrap().finished());
}

#[test]
fn timeout_finalized_against_the_stalling_player() {
    let (mut arbiter, white, red, game_id) = setup();
    let signer = arbiter.signer().clone();
    let moves = opening_pair(&signer, &white, &red, game_id);

    arbiter
        .init_timeout(red.addr, DEFAULT_TIMEOUT_STAKE, &moves)
        .unwrap();
    arbiter.host_mut().advance(TIMEOUT_DURATION + 1);
    arbiter.finalize_timeout(game_id).unwrap();

    // White never answered: red takes the escrow and the bond back.
    assert_eq!(
        arbiter.host().credited(red.addr),
        U256::from(200) + DEFAULT_TIMEOUT_STAKE
    );
    assert!(arbiter.game(game_id).unwrap().finished());
    assert!(matches!(
        arbiter.host().events[arbiter.host().events.len() - 2],
        ArbiterEvent::PlayerDisqualified { player, .. } if player == white.addr
    ));
}

#[test]
fn session_key_plays_for_the_primary() {
    let (mut arbiter, white, red, game_id) = setup();
    let session = player(0x33);
    arbiter
        .register_session_address(white.addr, game_id, session.addr)
        .unwrap();

    let signer = arbiter.signer().clone();
    let endgame = board(&[(14, WHITE_MAN), (22, RED_MAN)], true);
    let first = play(game_id, 6, red.addr, 1, &endgame, &step(22, 18));
    // White's winning jump is asserted and signed by the session key.
    let last = play(game_id, 7, session.addr, 0, &first.new_state, &jump(14, 23));

    let moves = [
        SignedGameMove::new(
            first.clone(),
            vec![sign(&signer, &red.key, &first), sign(&signer, &session.key, &first)],
        ),
        SignedGameMove::new(last.clone(), vec![sign(&signer, &session.key, &last)]),
    ];
    arbiter.finish_game(&moves).unwrap();

    // The payout goes to the primary address, not the session key.
    assert_eq!(arbiter.host().credited(white.addr), U256::from(200));
    assert_eq!(arbiter.host().credited(session.addr), U256::ZERO);
}
