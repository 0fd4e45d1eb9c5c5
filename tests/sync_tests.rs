//! Two-peer synchronization tests.
//!
//! Both engines run over one `LocalHub`. Reliable delivery is used where a
//! test needs a specific interleaving; chaotic delivery checks that replicas
//! converge whatever the order.

mod common;

use card_duel::transport::{DeliveryOptions, LocalHub, Transport};
use card_duel::{
    create_initial_state, CardCatalogue, CardId, Envelope, GameRng, Message, Move, Role, Round,
    RoundConfig,
};
use common::{exchange, keep, peer, peers, settle, started, to_duel, to_vote, Peer};

/// Send a raw envelope on the hub from an outside endpoint.
fn inject(hub: &LocalHub, envelope: Envelope) {
    let mut noise = hub.endpoint("noise");
    noise.subscribe();
    noise.send(envelope.encode().unwrap()).unwrap();
    noise.unsubscribe();
}

fn assert_converged(a: &Peer, b: &Peer) {
    assert_eq!(a.state(), b.state(), "replicas diverged");
    assert_eq!(a.generation(), b.generation());
}

// =============================================================================
// Init
// =============================================================================

/// The initializer holds `init` until the partner is present.
#[test]
fn test_init_gated_on_presence() {
    common::init_logging();
    let hub = LocalHub::new();
    let mut a = peer(&hub, Role::A, 11);
    a.start_game().unwrap();
    a.pump().unwrap();
    assert!(a.is_awaiting_init());
    assert!(a.submit_round1(&[]).is_err());

    let mut b = peer(&hub, Role::B, 11);
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(b.round(), Some(Round::One));
    assert_eq!(b.my_hand().len(), 20);
    assert_eq!(b.my_cards().len(), 20);
}

/// A redelivered `init` does not wipe progress.
#[test]
fn test_redelivered_init_is_ignored() {
    let (hub, mut a, mut b) = started(12);
    let initial = b.state().cloned().unwrap();

    let b_keep = keep(&b);
    b.submit_round1(&b_keep).unwrap();
    inject(&hub, Envelope::new(0, Message::Init { state: initial }));
    settle(&mut a, &mut b);

    assert!(b.state().unwrap().selections[Role::B].is_some());
    assert!(a.partner_done());
}

// =============================================================================
// Races
// =============================================================================

/// Partner cards that arrive first are held until the local selection.
#[test]
fn test_early_partner_cards() {
    let (_hub, mut a, mut b) = started(13);
    let a_keep = keep(&a);
    let b_keep = keep(&b);

    b.submit_round1(&b_keep).unwrap();
    settle(&mut a, &mut b);
    assert!(a.partner_done());
    assert_eq!(a.round(), Some(Round::One));

    a.submit_round1(&a_keep).unwrap();
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(a.round(), Some(Round::Two));
    assert_eq!(a.my_hand(), b_keep.as_slice());
    assert_eq!(b.my_hand(), a_keep.as_slice());
}

/// Replicas converge under shuffled, duplicated delivery.
#[test]
fn test_chaotic_delivery_converges() {
    for seed in 0..24 {
        let (_hub, mut a, mut b) = peers(DeliveryOptions::chaotic(0.3), seed);
        a.start_game().unwrap();
        settle(&mut a, &mut b);

        exchange(&mut a, &mut b);
        assert_converged(&a, &b);
        assert_eq!(a.round(), Some(Round::Two), "seed {seed}");

        let a_pick = a.my_hand()[1];
        let b_pick = b.my_hand()[1];
        b.submit_round2(b_pick).unwrap();
        a.submit_round2(a_pick).unwrap();
        settle(&mut a, &mut b);
        assert_eq!(a.round(), Some(Round::Vote), "seed {seed}");

        a.submit_vote(a_pick).unwrap();
        b.submit_vote(b_pick).unwrap();
        settle(&mut a, &mut b);
        assert_eq!(b.round(), Some(Round::HandDuel), "seed {seed}");

        a.submit_duel_move(Move::Rock).unwrap();
        b.submit_duel_move(Move::Rock).unwrap();
        settle(&mut a, &mut b);
        assert_converged(&a, &b);
        assert_eq!(a.state().unwrap().duel_attempt, 1, "seed {seed}");

        b.submit_duel_move(Move::Paper).unwrap();
        a.submit_duel_move(Move::Scissors).unwrap();
        settle(&mut a, &mut b);

        assert_converged(&a, &b);
        assert_eq!(a.decided_card(), Some(a_pick), "seed {seed}");
        assert_eq!(b.round(), Some(Round::Result));
        assert!(b.provisional_decision().is_none());
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Agreeing votes decide on both peers.
#[test]
fn test_vote_agreement() {
    let (_hub, mut a, mut b) = started(14);
    to_vote(&mut a, &mut b);
    let (_, second) = a.candidates().unwrap();

    a.submit_vote(second).unwrap();
    assert!(!b.partner_done());
    b.pump().unwrap();
    assert!(b.partner_done());
    b.submit_vote(second).unwrap();
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(a.decided_card(), Some(second));
}

/// The joiner holds a duel win as provisional until `decided` arrives.
#[test]
fn test_duel_win_is_provisional_on_joiner() {
    let (_hub, mut a, mut b) = started(15);
    to_duel(&mut a, &mut b);
    let (a_pick, _) = a.candidates().unwrap();

    a.submit_duel_move(Move::Rock).unwrap();
    b.submit_duel_move(Move::Scissors).unwrap();

    b.pump().unwrap();
    assert_eq!(b.provisional_decision(), Some(a_pick));
    assert_eq!(b.decided_card(), None);
    assert_eq!(b.round(), Some(Round::HandDuel));

    settle(&mut a, &mut b);
    assert_converged(&a, &b);
    assert_eq!(b.decided_card(), Some(a_pick));
    assert_eq!(b.provisional_decision(), None);
}

/// A draw restarts the duel on both sides; the next win decides.
#[test]
fn test_duel_draw_then_win() {
    let (_hub, mut a, mut b) = started(16);
    to_duel(&mut a, &mut b);
    let (_, b_pick) = a.candidates().unwrap();

    a.submit_duel_move(Move::Paper).unwrap();
    b.submit_duel_move(Move::Paper).unwrap();
    settle(&mut a, &mut b);
    assert_converged(&a, &b);
    assert_eq!(b.state().unwrap().duel_attempt, 1);

    // Moves from the drawn attempt do not carry over.
    assert!(!a.partner_done());

    a.submit_duel_move(Move::Rock).unwrap();
    b.submit_duel_move(Move::Paper).unwrap();
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(a.decided_card(), Some(b_pick));
}

// =============================================================================
// Generations
// =============================================================================

/// Restart from either side starts the next game on both.
#[test]
fn test_restart_starts_next_generation() {
    let (_hub, mut a, mut b) = started(17);
    to_vote(&mut a, &mut b);
    let (first, _) = a.candidates().unwrap();
    a.submit_vote(first).unwrap();
    b.submit_vote(first).unwrap();
    settle(&mut a, &mut b);
    let finished = a.state().cloned();

    b.restart().unwrap();
    assert!(b.is_awaiting_init());
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(b.generation(), 1);
    assert_eq!(b.round(), Some(Round::One));
    assert_ne!(a.state().cloned(), finished);

    exchange(&mut a, &mut b);
    let (pick_a, pick_b) = (a.my_hand()[0], b.my_hand()[0]);
    a.submit_round2(pick_a).unwrap();
    b.submit_round2(pick_b).unwrap();
    settle(&mut a, &mut b);
    a.submit_vote(pick_a).unwrap();
    b.submit_vote(pick_a).unwrap();
    settle(&mut a, &mut b);
    assert_eq!(b.decided_card(), Some(pick_a));

    a.restart().unwrap();
    settle(&mut a, &mut b);
    assert_converged(&a, &b);
    assert_eq!(a.generation(), 2);
}

/// Frames from a finished game are dropped.
#[test]
fn test_stale_generation_ignored() {
    let (hub, mut a, mut b) = started(18);
    to_vote(&mut a, &mut b);
    let (first, _) = a.candidates().unwrap();
    a.submit_vote(first).unwrap();
    b.submit_vote(first).unwrap();
    settle(&mut a, &mut b);
    a.restart().unwrap();
    settle(&mut a, &mut b);

    let stale = keep(&b);
    inject(
        &hub,
        Envelope::new(0, Message::CardsExchange { from: Role::B, cards: stale }),
    );
    settle(&mut a, &mut b);

    assert_eq!(a.generation(), 1);
    assert!(!a.partner_done());
}

/// Frames for the next game wait for its `init`.
#[test]
fn test_future_generation_deferred() {
    let (hub, mut a, mut b) = started(19);
    let next = create_initial_state(
        &CardCatalogue::builtin(),
        &RoundConfig::default(),
        &mut GameRng::new(99),
        1,
    )
    .unwrap();
    let cards = next.hands[Role::A][..5].to_vec();

    inject(&hub, Envelope::new(1, Message::CardsExchange { from: Role::A, cards }));
    inject(&hub, Envelope::new(1, Message::Init { state: next.clone() }));
    b.pump().unwrap();

    assert_eq!(b.generation(), 1);
    assert_eq!(b.state().map(|s| &s.hands), Some(&next.hands));
    assert!(b.partner_done());

    // The initializer never adopts someone else's init.
    a.pump().unwrap();
    assert_eq!(a.generation(), 0);
}

/// A frame claiming to come from this peer's own role is ignored.
#[test]
fn test_self_echo_ignored() {
    let (hub, mut a, mut b) = started(20);
    let cards = keep(&a);

    inject(&hub, Envelope::new(0, Message::CardsExchange { from: Role::A, cards }));
    settle(&mut a, &mut b);

    let state = a.state().unwrap();
    assert!(state.selections[Role::A].is_none());
    assert!(!a.partner_done());
    assert!(b.partner_done(), "the partner still records it");
}

/// Votes for a card outside the candidates never leave the peer.
#[test]
fn test_rejected_vote_not_broadcast() {
    let (_hub, mut a, mut b) = started(21);
    to_vote(&mut a, &mut b);

    assert!(a.submit_vote(CardId::new(9999)).is_err());
    settle(&mut a, &mut b);
    assert!(!b.partner_done());
}

// =============================================================================
// Disconnects
// =============================================================================

/// A selection whose send failed reaches the partner when it is submitted again.
#[test]
fn test_resubmit_after_failed_send() {
    let (_hub, mut a, mut b) = started(22);
    let a_keep = keep(&a);

    a.transport_mut().unsubscribe();
    assert!(a.submit_round1(&a_keep).is_err());
    b.pump().unwrap();
    assert!(!b.partner_done());

    a.transport_mut().subscribe();
    a.submit_round1(&a_keep).unwrap();
    settle(&mut a, &mut b);

    assert!(b.partner_done());
    let b_keep = keep(&b);
    b.submit_round1(&b_keep).unwrap();
    settle(&mut a, &mut b);
    assert_converged(&a, &b);
    assert_eq!(a.round(), Some(Round::Two));
}

/// A duel decision committed while disconnected still reaches the joiner.
#[test]
fn test_duel_decision_survives_failed_send() {
    let (_hub, mut a, mut b) = started(23);
    to_duel(&mut a, &mut b);
    let (a_pick, _) = a.candidates().unwrap();

    b.submit_duel_move(Move::Scissors).unwrap();
    a.pump().unwrap();

    a.transport_mut().unsubscribe();
    assert!(a.submit_duel_move(Move::Rock).is_err());
    assert_eq!(a.decided_card(), Some(a_pick));
    assert_eq!(a.unsent_frames(), 2);

    a.transport_mut().subscribe();
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(b.decided_card(), Some(a_pick));
    assert!(b.provisional_decision().is_none());
}

/// A partner restart that overtakes the decision waits for it.
#[test]
fn test_restart_held_until_decision() {
    let (hub, mut a, mut b) = started(24);
    to_vote(&mut a, &mut b);
    let (first, _) = a.candidates().unwrap();

    inject(&hub, Envelope::new(0, Message::Restart { from: Role::B }));
    a.pump().unwrap();
    assert_eq!(a.generation(), 0);
    assert_eq!(a.round(), Some(Round::Vote));

    a.submit_vote(first).unwrap();
    b.submit_vote(first).unwrap();
    settle(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(a.generation(), 1);
    assert_eq!(b.round(), Some(Round::One));
}
