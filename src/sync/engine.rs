//! The synchronization engine.
//!
//! One `SyncEngine` per peer. It owns that peer's copy of the game state and
//! is the only code that writes it. Local actions go through the pure
//! transitions in [`crate::rules`] and are then broadcast; inbound frames are
//! decoded and folded through the same transitions by [`SyncEngine::pump`].
//!
//! ## Races
//!
//! - **Init**: the initializer keeps the dealt state queued until the
//!   channel is joined and both participants are present. Delivery is not
//!   retroactive, so an early `init` could be lost.
//! - **Early partner payloads**: parked in a [`PendingBuffer`] slot and
//!   flushed when the local precondition holds. Round-1 cards that arrive
//!   before the local selection are consumed by the local submission itself.
//! - **Decision**: `decided` is first-wins. Only the initializer commits a
//!   duel win; the joiner holds it as a provisional decision until the
//!   `decided` frame arrives.
//! - **Generations**: frames carry the game number. Frames for an older game
//!   are dropped, frames for a newer one are deferred until its `init`.
//!   A partner's `restart` that beats the local decision waits for it.
//!
//! ## Outbox
//!
//! Every outbound frame is queued before it is sent and stays queued until
//! the transport accepts it. A failed send leaves the local state change in
//! place and returns the transport error; the frame goes out on the next
//! `pump` or local action, including a repeated submission.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use super::message::{Envelope, Message};
use super::pending::PendingBuffer;
use crate::cards::{Card, CardCatalogue, CardId};
use crate::core::{EngineConfig, EngineError, GameRng, GameState, Move, Role, Round, SubmitError};
use crate::rules::{
    apply_duel_move, apply_round1_submission, apply_round2_submission, apply_vote,
    commit_decision, create_initial_state, evaluate_duel, evaluate_final_picks, evaluate_votes,
    restart_duel, settle_duel, Applied, DuelOutcome, PickOutcome, VoteOutcome,
};
use crate::transport::{Inbound, Transport};

/// Frames from a newer game kept while waiting for its `init`.
const MAX_DEFERRED: usize = 64;

/// One peer's replica of the game plus its channel endpoint.
pub struct SyncEngine<T: Transport> {
    config: EngineConfig,
    role: Role,
    transport: T,
    catalogue: CardCatalogue,
    rng: GameRng,

    /// Local replica. `None` until `init` is sent (initializer) or adopted.
    state: Option<GameState>,

    /// Generation of the current (or awaited) game.
    generation: u32,

    /// Dealt state waiting for the channel to become ready.
    queued_init: Option<GameState>,

    pending: PendingBuffer,
    deferred: Vec<Envelope>,

    /// Encoded frames not yet accepted by the transport.
    outbox: VecDeque<String>,

    /// Partner restarted before this peer saw the decision.
    restart_parked: bool,

    /// Duel win computed by the joiner, pending the initializer's `decided`.
    provisional: Option<CardId>,
}

impl<T: Transport> SyncEngine<T> {
    /// Create an engine for `role` on `transport`, dealing from the built-in
    /// catalogue.
    pub fn new(config: EngineConfig, role: Role, transport: T) -> Result<Self, EngineError> {
        config.rounds.validate()?;
        let rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);

        Ok(Self {
            config,
            role,
            transport,
            catalogue: CardCatalogue::builtin(),
            rng,
            state: None,
            generation: 0,
            queued_init: None,
            pending: PendingBuffer::new(),
            deferred: Vec::new(),
            outbox: VecDeque::new(),
            restart_parked: false,
            provisional: None,
        })
    }

    /// Deal from `catalogue` instead of the built-in one.
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: CardCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The local replica, once a game is live.
    #[must_use]
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn round(&self) -> Option<Round> {
        self.state.as_ref().map(|s| s.round)
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn catalogue(&self) -> &CardCatalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// This peer's current hand (empty without a game).
    #[must_use]
    pub fn my_hand(&self) -> &[CardId] {
        match &self.state {
            Some(state) => state.hand(self.role),
            None => &[],
        }
    }

    /// This peer's current hand resolved against the catalogue.
    #[must_use]
    pub fn my_cards(&self) -> Vec<&Card> {
        self.my_hand()
            .iter()
            .filter_map(|&id| self.catalogue.get(id))
            .collect()
    }

    /// The two cards being voted or duelled over.
    #[must_use]
    pub fn candidates(&self) -> Option<(CardId, CardId)> {
        self.state.as_ref().and_then(GameState::candidates)
    }

    #[must_use]
    pub fn decided_card(&self) -> Option<CardId> {
        self.state.as_ref().and_then(|s| s.decided_card)
    }

    /// Duel win computed locally by the joiner but not yet confirmed.
    #[must_use]
    pub fn provisional_decision(&self) -> Option<CardId> {
        self.provisional
    }

    /// Frames queued for the partner that the transport has not accepted.
    #[must_use]
    pub fn unsent_frames(&self) -> usize {
        self.outbox.len()
    }

    /// No live game yet: waiting to send (initializer) or receive `init`.
    #[must_use]
    pub fn is_awaiting_init(&self) -> bool {
        self.state.is_none()
    }

    /// Whether the partner has already submitted for the current stage.
    #[must_use]
    pub fn partner_done(&self) -> bool {
        let Some(state) = &self.state else {
            return false;
        };
        let partner = self.role.partner();
        match state.round {
            Round::One => state.selections[partner].is_some() || self.pending.has_selection(),
            Round::Two => state.final_picks[partner].is_some() || self.pending.has_final_pick(),
            Round::Vote => state.votes[partner].is_some() || self.pending.has_vote(),
            Round::HandDuel => {
                state.duel_moves[partner].is_some()
                    || self.pending.has_duel_move(state.duel_attempt)
            }
            Round::Result => false,
        }
    }

    // === Session ===

    /// Deal a fresh game and queue its `init` until the channel is ready.
    ///
    /// Only the initializer deals, once per generation. Later games are dealt
    /// by [`SyncEngine::restart`].
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        if !self.role.is_initializer() {
            return Err(EngineError::NotInitializer);
        }
        if self.state.is_some() || self.queued_init.is_some() {
            return Err(EngineError::GameInProgress(self.generation));
        }

        let mut rng = self.rng.fork();
        let state =
            create_initial_state(&self.catalogue, &self.config.rounds, &mut rng, self.generation)?;
        info!(role = %self.role, generation = self.generation, "game dealt");

        self.pending.clear();
        self.provisional = None;
        self.queued_init = Some(state);
        self.flush_init()?;
        self.flush_outbox()
    }

    /// Drain the transport, folding every inbound event into local state.
    ///
    /// Returns the number of events processed. Malformed or irrelevant frames
    /// are logged and dropped; only transport failures are errors.
    pub fn pump(&mut self) -> Result<usize, EngineError> {
        let mut processed = 0;
        while let Some(inbound) = self.transport.poll() {
            processed += 1;
            match inbound {
                Inbound::Frame(frame) => match Envelope::decode(&frame) {
                    Ok(envelope) => self.handle_envelope(envelope)?,
                    Err(err) => warn!(role = %self.role, %err, "dropping malformed frame"),
                },
                Inbound::Presence(event) => {
                    debug!(role = %self.role, ?event, members = self.transport.members(), "presence")
                }
                Inbound::Status(status) => debug!(role = %self.role, ?status, "channel status"),
            }
            self.flush_init()?;
        }
        self.flush_init()?;
        self.flush_outbox()?;
        Ok(processed)
    }

    /// Leave the finished game. The initializer deals the next one.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_ref().ok_or(SubmitError::NoGame)?;
        if !state.is_finished() {
            return Err(SubmitError::WrongRound {
                expected: Round::Result,
                actual: state.round,
            }
            .into());
        }

        self.broadcast(Message::Restart { from: self.role })?;
        self.begin_next_generation()?;
        self.flush_outbox()
    }

    // === Local actions ===

    /// Submit this peer's round-1 keep set.
    pub fn submit_round1(&mut self, cards: &[CardId]) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(SubmitError::NoGame)?;
        if apply_round1_submission(state, &self.config.rounds, self.role, cards)? == Applied::Replay {
            debug!(role = %self.role, "round-1 selection already submitted");
            return self.flush_outbox();
        }

        self.broadcast(Message::CardsExchange {
            from: self.role,
            cards: cards.to_vec(),
        })?;
        self.advance()?;
        self.flush_outbox()
    }

    /// Submit this peer's round-2 pick.
    pub fn submit_round2(&mut self, card: CardId) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(SubmitError::NoGame)?;
        if apply_round2_submission(state, self.role, card)? == Applied::Replay {
            debug!(role = %self.role, "final pick already submitted");
            return self.flush_outbox();
        }

        self.broadcast(Message::FinalPick { from: self.role, card_id: card })?;
        self.advance()?;
        self.flush_outbox()
    }

    /// Vote for one of the two candidates.
    pub fn submit_vote(&mut self, card: CardId) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(SubmitError::NoGame)?;
        if apply_vote(state, self.role, card)? == Applied::Replay {
            debug!(role = %self.role, "vote already submitted");
            return self.flush_outbox();
        }

        self.broadcast(Message::Vote { from: self.role, card_id: card })?;
        self.advance()?;
        self.flush_outbox()
    }

    /// Play a move in the current duel.
    pub fn submit_duel_move(&mut self, mv: Move) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(SubmitError::NoGame)?;
        let attempt = state.duel_attempt;
        if apply_duel_move(state, self.role, mv)? == Applied::Replay {
            debug!(role = %self.role, attempt, "duel move already submitted");
            return self.flush_outbox();
        }

        self.broadcast(Message::DuelMove { from: self.role, mv, attempt })?;
        self.advance()?;
        self.flush_outbox()
    }

    // === Inbound ===

    fn handle_envelope(&mut self, envelope: Envelope) -> Result<(), EngineError> {
        let Envelope { generation, message } = envelope;

        if let Message::Init { state } = message {
            return self.on_init(generation, state);
        }

        if message.sender() == Some(self.role) {
            trace!(role = %self.role, event = message.event(), "ignoring self echo");
            return Ok(());
        }
        if generation < self.generation {
            debug!(role = %self.role, generation, event = message.event(), "dropping stale frame");
            return Ok(());
        }
        if generation > self.generation || self.state.is_none() {
            self.defer(Envelope { generation, message });
            return Ok(());
        }

        match message {
            Message::Init { .. } => Ok(()),
            Message::CardsExchange { from, cards } => self.on_partner_selection(from, cards),
            Message::FinalPick { from, card_id } => self.on_partner_final_pick(from, card_id),
            Message::Vote { from, card_id } => self.on_partner_vote(from, card_id),
            Message::DuelMove { from, mv, attempt } => self.on_partner_duel_move(from, mv, attempt),
            Message::Decided { card_id } => self.on_decided(card_id),
            Message::Restart { from } => self.on_partner_restart(from),
        }
    }

    fn on_partner_restart(&mut self, from: Role) -> Result<(), EngineError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        if state.is_finished() {
            info!(role = %self.role, %from, generation = self.generation, "partner restarted");
            return self.begin_next_generation();
        }

        // The partner only restarts from a decided game, so the decision is
        // still in flight here.
        if !self.restart_parked {
            warn!(role = %self.role, %from, round = %state.round, "partner restarted before local decision, holding");
            self.restart_parked = true;
        }
        Ok(())
    }

    /// Follow a held partner restart once the local game is decided.
    fn resume_parked_restart(&mut self) -> Result<(), EngineError> {
        let finished = self.state.as_ref().is_some_and(GameState::is_finished);
        if !self.restart_parked || !finished {
            return Ok(());
        }
        info!(role = %self.role, generation = self.generation, "decision reached, following partner restart");
        self.begin_next_generation()
    }

    fn on_init(&mut self, generation: u32, state: GameState) -> Result<(), EngineError> {
        if self.role.is_initializer() {
            trace!(role = %self.role, generation, "ignoring init echo");
            return Ok(());
        }
        if state.generation != generation {
            warn!(role = %self.role, generation, state_generation = state.generation, "init generation mismatch");
            return Ok(());
        }
        let newer = match &self.state {
            Some(current) => generation > current.generation,
            None => generation >= self.generation,
        };
        if !newer {
            debug!(role = %self.role, generation, "ignoring redelivered init");
            return Ok(());
        }

        info!(role = %self.role, generation, "adopted game state");
        if generation != self.generation {
            self.pending.clear();
        }
        self.generation = generation;
        self.state = Some(state);
        self.provisional = None;
        self.restart_parked = false;

        let deferred = std::mem::take(&mut self.deferred);
        for envelope in deferred {
            self.handle_envelope(envelope)?;
        }
        Ok(())
    }

    fn defer(&mut self, envelope: Envelope) {
        if self.deferred.len() >= MAX_DEFERRED {
            warn!(role = %self.role, "deferred frame buffer full, dropping oldest");
            self.deferred.remove(0);
        }
        debug!(role = %self.role, generation = envelope.generation, event = envelope.message.event(), "deferring frame until init");
        self.deferred.push(envelope);
    }

    fn on_partner_selection(&mut self, from: Role, cards: Vec<CardId>) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        if state.round > Round::One || state.selections[from].is_some() {
            trace!(role = %self.role, "round-1 cards replayed");
            return Ok(());
        }
        if state.selections[self.role].is_none() {
            if self.pending.park_selection(cards) {
                debug!(role = %self.role, "partner cards arrived before local selection, parked");
            }
            return Ok(());
        }

        match apply_round1_submission(state, &self.config.rounds, from, &cards) {
            Ok(_) => self.advance(),
            Err(err) => {
                warn!(role = %self.role, %err, "rejecting partner round-1 cards");
                Ok(())
            }
        }
    }

    fn on_partner_final_pick(&mut self, from: Role, card: CardId) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        match state.round {
            Round::One => {
                self.pending.park_final_pick(card);
                Ok(())
            }
            Round::Two => match apply_round2_submission(state, from, card) {
                Ok(_) => self.advance(),
                Err(err) => {
                    warn!(role = %self.role, %err, "rejecting partner final pick");
                    Ok(())
                }
            },
            _ => Ok(()),
        }
    }

    fn on_partner_vote(&mut self, from: Role, card: CardId) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        match state.round {
            Round::One | Round::Two => {
                self.pending.park_vote(card);
                Ok(())
            }
            Round::Vote => match apply_vote(state, from, card) {
                Ok(_) => self.advance(),
                Err(err) => {
                    warn!(role = %self.role, %err, "rejecting partner vote");
                    Ok(())
                }
            },
            _ => Ok(()),
        }
    }

    fn on_partner_duel_move(&mut self, from: Role, mv: Move, attempt: u32) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        let current = state.duel_attempt;
        match state.round {
            Round::Result => Ok(()),
            Round::HandDuel if attempt == current => match apply_duel_move(state, from, mv) {
                Ok(_) => self.advance(),
                Err(err) => {
                    warn!(role = %self.role, %err, "rejecting partner duel move");
                    Ok(())
                }
            },
            Round::HandDuel if attempt < current => {
                trace!(role = %self.role, attempt, current, "stale duel move");
                Ok(())
            }
            _ => {
                self.pending.park_duel_move(attempt, mv);
                Ok(())
            }
        }
    }

    fn on_decided(&mut self, card: CardId) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        match commit_decision(state, card) {
            Applied::Recorded => {
                info!(role = %self.role, %card, "decision received");
                if let Some(provisional) = self.provisional.filter(|&p| p != card) {
                    warn!(role = %self.role, %provisional, %card, "provisional decision overridden");
                }
                self.provisional = None;
                self.pending.clear();
            }
            Applied::Replay => {
                if state.decided_card != Some(card) {
                    warn!(role = %self.role, %card, decided = ?state.decided_card, "conflicting decision ignored");
                }
            }
        }
        self.resume_parked_restart()
    }

    // === Progress ===

    /// Flush parked payloads and run evaluations until nothing changes.
    fn advance(&mut self) -> Result<(), EngineError> {
        loop {
            let flushed = self.flush_pending();
            let evaluated = self.evaluate()?;
            if !flushed && !evaluated {
                return self.resume_parked_restart();
            }
        }
    }

    /// Apply the parked partner payload whose precondition now holds.
    fn flush_pending(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let partner = self.role.partner();

        let result = match state.round {
            Round::One if state.selections[self.role].is_some() => self
                .pending
                .take_selection()
                .map(|cards| apply_round1_submission(state, &self.config.rounds, partner, &cards)),
            Round::Two => self
                .pending
                .take_final_pick()
                .map(|card| apply_round2_submission(state, partner, card)),
            Round::Vote => self.pending.take_vote().map(|card| apply_vote(state, partner, card)),
            Round::HandDuel => self
                .pending
                .take_duel_move(state.duel_attempt)
                .map(|mv| apply_duel_move(state, partner, mv)),
            _ => None,
        };

        match result {
            Some(Ok(Applied::Recorded)) => {
                debug!(role = %self.role, round = %state.round, "flushed parked partner payload");
                true
            }
            Some(Ok(Applied::Replay)) | None => false,
            Some(Err(err)) => {
                warn!(role = %self.role, %err, "dropping parked partner payload");
                false
            }
        }
    }

    /// Run the evaluation for the current round. Returns true if the round
    /// changed or the duel restarted.
    fn evaluate(&mut self) -> Result<bool, EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(false);
        };

        match state.round {
            Round::Two => match evaluate_final_picks(state) {
                PickOutcome::Pending => Ok(false),
                PickOutcome::Matched(card) => {
                    info!(role = %self.role, %card, "final picks matched");
                    self.broadcast(Message::Decided { card_id: card })?;
                    Ok(true)
                }
                PickOutcome::Split { a, b } => {
                    info!(role = %self.role, %a, %b, "final picks differ, voting");
                    Ok(true)
                }
            },
            Round::Vote => match evaluate_votes(state) {
                VoteOutcome::Pending => Ok(false),
                VoteOutcome::Agreed(card) => {
                    info!(role = %self.role, %card, "votes agree");
                    self.broadcast(Message::Decided { card_id: card })?;
                    Ok(true)
                }
                VoteOutcome::Split => {
                    info!(role = %self.role, "votes split, hand-duel");
                    Ok(true)
                }
            },
            Round::HandDuel if self.role.is_initializer() => match settle_duel(state) {
                DuelOutcome::Pending => Ok(false),
                DuelOutcome::Draw { next_attempt } => {
                    info!(role = %self.role, next_attempt, "duel drawn");
                    Ok(true)
                }
                DuelOutcome::Won { winner, card } => {
                    info!(role = %self.role, %winner, %card, "duel won");
                    self.broadcast(Message::Decided { card_id: card })?;
                    Ok(true)
                }
            },
            Round::HandDuel => match evaluate_duel(state) {
                DuelOutcome::Pending => Ok(false),
                DuelOutcome::Draw { next_attempt } => {
                    restart_duel(state);
                    info!(role = %self.role, next_attempt, "duel drawn");
                    Ok(true)
                }
                DuelOutcome::Won { winner, card } => {
                    if self.provisional.is_none() {
                        debug!(role = %self.role, %winner, %card, "duel won, awaiting decision");
                        self.provisional = Some(card);
                    }
                    Ok(false)
                }
            },
            Round::One | Round::Result => Ok(false),
        }
    }

    // === Outbound ===

    /// Encode `message` for the current generation and queue it.
    fn broadcast(&mut self, message: Message) -> Result<(), EngineError> {
        let event = message.event();
        let frame = Envelope::new(self.generation, message).encode()?;
        self.outbox.push_back(frame);
        debug!(role = %self.role, generation = self.generation, event, "queued");
        Ok(())
    }

    /// Hand queued frames to the transport in order. A frame leaves the
    /// queue only once it was accepted.
    fn flush_outbox(&mut self) -> Result<(), EngineError> {
        while let Some(frame) = self.outbox.front() {
            if let Err(err) = self.transport.send(frame.clone()) {
                warn!(role = %self.role, %err, unsent = self.outbox.len(), "send failed, frames kept");
                return Err(err.into());
            }
            self.outbox.pop_front();
        }
        Ok(())
    }

    /// Send the queued `init` once the channel is ready.
    fn flush_init(&mut self) -> Result<(), EngineError> {
        if self.queued_init.is_none() || !self.transport.is_ready(self.config.ready_members) {
            return Ok(());
        }
        let Some(state) = self.queued_init.take() else {
            return Ok(());
        };

        self.broadcast(Message::Init { state: state.clone() })?;
        info!(role = %self.role, generation = state.generation, "init broadcast");
        self.state = Some(state);

        // Partner frames for this generation that beat the init here.
        let deferred = std::mem::take(&mut self.deferred);
        for envelope in deferred {
            self.handle_envelope(envelope)?;
        }
        Ok(())
    }

    fn begin_next_generation(&mut self) -> Result<(), EngineError> {
        self.generation = self.state.as_ref().map_or(self.generation, |s| s.generation) + 1;
        self.state = None;
        self.queued_init = None;
        if !self.pending.is_empty() {
            debug!(role = %self.role, "discarding parked partner payloads");
            self.pending.clear();
        }
        self.provisional = None;
        self.restart_parked = false;
        debug!(role = %self.role, generation = self.generation, "awaiting next game");

        if self.role.is_initializer() {
            self.start_game()?;
        }
        Ok(())
    }
}
