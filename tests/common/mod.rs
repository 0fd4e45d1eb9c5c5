//! Shared helpers for integration tests.

#![allow(dead_code)]

use card_duel::transport::{DeliveryOptions, LocalEndpoint, LocalHub};
use card_duel::{CardId, EngineConfig, Role, SyncEngine};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once per binary.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `"warn"`.
pub fn init_logging() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub type Peer = SyncEngine<LocalEndpoint>;

/// Subscribed engine for `role` on `hub`.
pub fn peer(hub: &LocalHub, role: Role, seed: u64) -> Peer {
    let mut endpoint = hub.endpoint(role.to_string());
    endpoint.subscribe();
    SyncEngine::new(EngineConfig::new().with_seed(seed), role, endpoint).unwrap()
}

/// Both peers on a fresh hub with the given delivery behavior.
pub fn peers(options: DeliveryOptions, seed: u64) -> (LocalHub, Peer, Peer) {
    init_logging();
    let hub = LocalHub::with_delivery(seed, options);
    let a = peer(&hub, Role::A, seed);
    let b = peer(&hub, Role::B, seed);
    (hub, a, b)
}

/// Pump both peers until neither has anything left to process.
pub fn settle(a: &mut Peer, b: &mut Peer) {
    loop {
        let processed = a.pump().unwrap() + b.pump().unwrap();
        if processed == 0 {
            break;
        }
    }
}

/// Reliable pair with the first game adopted by both.
pub fn started(seed: u64) -> (LocalHub, Peer, Peer) {
    let (hub, mut a, mut b) = peers(DeliveryOptions::reliable(), seed);
    a.start_game().unwrap();
    settle(&mut a, &mut b);
    (hub, a, b)
}

/// The first `keep_count` cards of the peer's hand.
pub fn keep(peer: &Peer) -> Vec<CardId> {
    let count = card_duel::core::DEFAULT_KEEP_COUNT;
    peer.my_hand()[..count].to_vec()
}

/// Play round 1 with each peer keeping its first cards.
pub fn exchange(a: &mut Peer, b: &mut Peer) {
    let a_keep = keep(a);
    let b_keep = keep(b);
    a.submit_round1(&a_keep).unwrap();
    b.submit_round1(&b_keep).unwrap();
    settle(a, b);
}

/// Play through round 2 with different picks, ending in the vote.
pub fn to_vote(a: &mut Peer, b: &mut Peer) {
    exchange(a, b);
    let a_pick = a.my_hand()[0];
    let b_pick = b.my_hand()[0];
    a.submit_round2(a_pick).unwrap();
    b.submit_round2(b_pick).unwrap();
    settle(a, b);
}

/// Continue from the vote with a split, ending in the hand-duel.
pub fn to_duel(a: &mut Peer, b: &mut Peer) {
    to_vote(a, b);
    let (first, second) = a.candidates().unwrap();
    a.submit_vote(first).unwrap();
    b.submit_vote(second).unwrap();
    settle(a, b);
}
