//! The two-slot session state machine.
//!
//! A [`Session`] is the relay's record of one match: at most two
//! participants in arrival order, whose turn it is, and which [`Phase`] the
//! match is in. Every operation completes synchronously: it mutates the
//! session and pushes zero or more envelopes through [`Delivery`], or it
//! returns a [`SessionError`] and leaves the session untouched.
//!
//! A full reset (third join, or a participant's connection closing) starts
//! a new *generation*: the slot list is replaced, never patched.

use duelrelay_protocol::{
    Codec, Identity, JsonCodec, MessageKind, PlayerNum, ServerMessage,
};
use duelrelay_transport::ConnectionId;
use serde_json::Value;

use crate::{Delivery, Outbox, Phase, SessionError};

/// Maximum number of participants in one session.
const SLOTS: usize = 2;

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One joined client.
#[derive(Debug)]
pub struct Participant {
    outbox: Outbox,
    identity: Identity,
    ready: bool,
}

impl Participant {
    /// The identity the client supplied at join time.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether the client has committed its private state.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The connection that owns this slot.
    pub fn connection_id(&self) -> ConnectionId {
        self.outbox.connection_id()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A turn-ending action.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The defender answers a shot; forwarded to the shooter.
    Shot {
        cell_index: Value,
        hit: bool,
        proof: Option<Value>,
    },
    /// The turn holder gives up the turn.
    Pass,
}

impl Resolution {
    fn kind(&self) -> MessageKind {
        match self {
            Self::Shot { .. } => MessageKind::ShotResult,
            Self::Pass => MessageKind::PassTurn,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionInfo
// ---------------------------------------------------------------------------

/// A snapshot of session metadata, for inspection and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Number of resets since the session was created.
    pub generation: u64,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Identities in slot order.
    pub players: Vec<Identity>,
    /// Ready flags in slot order.
    pub ready: Vec<bool>,
    /// The turn holder, only while the phase is `Active`.
    pub turn: Option<PlayerNum>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The match state for one pair of clients.
///
/// Not thread-safe by itself; the session actor owns it and applies one
/// operation at a time.
#[derive(Debug)]
pub struct Session<C: Codec = JsonCodec> {
    slots: Vec<Participant>,
    /// Slot index allowed to act. Only meaningful while `Active`.
    turn: usize,
    phase: Phase,
    generation: u64,
    delivery: Delivery<C>,
}

impl Default for Session<JsonCodec> {
    fn default() -> Self {
        Self::new(JsonCodec)
    }
}

impl<C: Codec> Session<C> {
    /// Creates an empty session in the `Waiting` phase.
    pub fn new(codec: C) -> Self {
        Self {
            slots: Vec::with_capacity(SLOTS),
            turn: 0,
            phase: Phase::Waiting,
            generation: 0,
            delivery: Delivery::new(codec),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the slot index of the turn holder while `Active`.
    pub fn turn(&self) -> Option<usize> {
        self.phase.is_active().then_some(self.turn)
    }

    /// Participants in slot order.
    pub fn participants(&self) -> &[Participant] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The delivery helper, for replies to callers without a slot.
    pub fn delivery(&self) -> &Delivery<C> {
        &self.delivery
    }

    /// Returns the slot held by `conn` in the current generation.
    pub fn slot_of(&self, conn: ConnectionId) -> Option<usize> {
        self.slots.iter().position(|p| p.connection_id() == conn)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            generation: self.generation,
            phase: self.phase,
            players: self.slots.iter().map(|p| p.identity.clone()).collect(),
            ready: self.slots.iter().map(|p| p.ready).collect(),
            turn: self.turn().map(PlayerNum::from_slot),
        }
    }

    /// Checks the precondition of `kind` for `conn` and returns its slot.
    ///
    /// An unseated caller is [`SessionError::UnknownConnection`], except
    /// for kinds that answer strangers, which get
    /// [`SessionError::NotYourTurn`]. A seated caller of a turn-gated kind
    /// must hold the turn while the session is `Active`.
    ///
    /// Kinds that need no slot always pass; the returned index is then the
    /// slot the caller would take next.
    pub fn authorize(
        &self,
        conn: ConnectionId,
        kind: MessageKind,
    ) -> Result<usize, SessionError> {
        let Some(slot) = self.slot_of(conn) else {
            if !kind.requires_participant() {
                return Ok(self.slots.len());
            }
            return Err(if kind.answers_strangers() {
                SessionError::NotYourTurn
            } else {
                SessionError::UnknownConnection(conn)
            });
        };
        if kind.requires_turn() && self.turn() != Some(slot) {
            return Err(SessionError::NotYourTurn);
        }
        Ok(slot)
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Seats the caller in the next free slot.
    ///
    /// A join while both slots are taken discards the current generation
    /// first, even when the caller holds one of them. Filling the second
    /// slot arms the session and introduces the two participants to each
    /// other. A caller already seated in a half-full session just gets its
    /// `joined` reply again.
    pub fn join(&mut self, caller: &Outbox, identity: Identity) -> PlayerNum {
        let seated = self
            .slot_of(caller.connection_id())
            .filter(|_| self.slots.len() < SLOTS);
        if let Some(slot) = seated {
            let player_num = PlayerNum::from_slot(slot);
            let identity = self.slots[slot].identity.clone();
            self.delivery.send_to(
                caller,
                &ServerMessage::Joined {
                    player_num,
                    identity,
                },
            );
            return player_num;
        }

        if self.slots.len() >= SLOTS {
            tracing::info!(
                generation = self.generation,
                "session full, starting over for new join"
            );
            self.reset();
        }

        let player_num = PlayerNum::from_slot(self.slots.len());
        self.slots.push(Participant {
            outbox: caller.clone(),
            identity: identity.clone(),
            ready: false,
        });
        tracing::info!(
            generation = self.generation,
            conn_id = %caller.connection_id(),
            player = %player_num,
            %identity,
            "player joined"
        );

        self.delivery.send_to(
            caller,
            &ServerMessage::Joined {
                player_num,
                identity,
            },
        );

        if self.slots.len() == SLOTS {
            self.phase = Phase::Armed;
            for (slot, other) in [(0, 1), (1, 0)] {
                self.delivery.send_to(
                    &self.slots[slot].outbox,
                    &ServerMessage::opponent_joined(
                        self.slots[other].identity.clone(),
                    ),
                );
            }
            tracing::info!(generation = self.generation, "both players connected");
        }

        player_num
    }

    /// Marks the caller ready and starts the battle once both are.
    pub fn mark_ready(&mut self, conn: ConnectionId) -> Result<(), SessionError> {
        let slot = self.authorize(conn, MessageKind::BoardCommitted)?;
        self.slots[slot].ready = true;
        tracing::info!(
            generation = self.generation,
            player = %PlayerNum::from_slot(slot),
            "player committed"
        );

        self.delivery.broadcast_except(
            self.slots.iter().map(|p| &p.outbox),
            &ServerMessage::OpponentReady,
            conn,
        );

        if self.slots.len() == SLOTS
            && self.slots.iter().all(|p| p.ready)
            && self.phase.can_start_battle()
        {
            self.phase = Phase::Active;
            self.turn = 0;
            self.send_per_slot(|slot| ServerMessage::BattleStart {
                your_turn: slot == 0,
            });
            tracing::info!(
                generation = self.generation,
                "battle started, player 1 goes first"
            );
        }
        Ok(())
    }

    /// Turn-gated action: forwards a shot to the opponent. Does not end the
    /// turn.
    pub fn act(
        &mut self,
        conn: ConnectionId,
        cell_index: Value,
    ) -> Result<(), SessionError> {
        let slot = self.authorize(conn, MessageKind::Fire)?;
        tracing::info!(
            generation = self.generation,
            player = %PlayerNum::from_slot(slot),
            %cell_index,
            "player fired"
        );
        self.send_to_other(
            slot,
            &ServerMessage::IncomingShot {
                cell_index,
                from_player: PlayerNum::from_slot(slot),
            },
        );
        Ok(())
    }

    /// Turn-ending action: forwards the resolution (if any) to the
    /// opponent, flips the turn, and tells both sides whose turn it is.
    pub fn resolve(
        &mut self,
        conn: ConnectionId,
        resolution: Resolution,
    ) -> Result<(), SessionError> {
        let kind = resolution.kind();
        let slot = self.authorize(conn, kind)?;
        if !self.phase.is_active() {
            return Err(SessionError::InvalidPhase {
                kind,
                phase: self.phase,
            });
        }

        if let Resolution::Shot {
            cell_index,
            hit,
            proof,
        } = resolution
        {
            tracing::info!(
                generation = self.generation,
                player = %PlayerNum::from_slot(slot),
                %cell_index,
                hit,
                "shot resolved"
            );
            self.send_to_other(
                slot,
                &ServerMessage::ShotResolved {
                    cell_index,
                    hit,
                    proof,
                },
            );
        }

        self.turn = 1 - self.turn;
        let turn = self.turn;
        self.send_per_slot(|slot| ServerMessage::TurnUpdate {
            your_turn: slot == turn,
        });
        tracing::info!(
            generation = self.generation,
            %kind,
            turn = %PlayerNum::from_slot(turn),
            "turn changed"
        );
        Ok(())
    }

    /// Untyped pass-through: forwards a card game action verbatim.
    pub fn relay(
        &mut self,
        conn: ConnectionId,
        action: String,
        payload: Option<Value>,
    ) -> Result<(), SessionError> {
        let slot = self.authorize(conn, MessageKind::TcgAction)?;
        tracing::debug!(
            generation = self.generation,
            player = %PlayerNum::from_slot(slot),
            %action,
            "relaying card action"
        );
        self.send_to_other(slot, &ServerMessage::TcgAction { action, payload });
        Ok(())
    }

    /// The caller claims victory. The opponent is told it lost, and the
    /// round is wound down with both participants kept seated so they can
    /// commit again for a rematch.
    pub fn declare_winner(&mut self, conn: ConnectionId) -> Result<(), SessionError> {
        let slot = self.authorize(conn, MessageKind::GameOver)?;
        let winner = self.slots[slot].identity.clone();
        self.send_to_other(
            slot,
            &ServerMessage::YouLost {
                winner_address: winner,
            },
        );

        for participant in &mut self.slots {
            participant.ready = false;
        }
        self.turn = 0;
        self.phase = if self.slots.len() == SLOTS {
            Phase::Ended
        } else {
            Phase::Waiting
        };
        tracing::info!(
            generation = self.generation,
            winner = %PlayerNum::from_slot(slot),
            "round over"
        );
        Ok(())
    }

    /// Handles a closed connection. If it held a slot, the remaining
    /// participant is told and the session is reset. Returns whether the
    /// connection was seated.
    pub fn disconnect(&mut self, conn: ConnectionId) -> bool {
        let Some(slot) = self.slot_of(conn) else {
            return false;
        };
        tracing::info!(
            generation = self.generation,
            player = %PlayerNum::from_slot(slot),
            "player disconnected"
        );
        self.delivery.broadcast_except(
            self.slots.iter().map(|p| &p.outbox),
            &ServerMessage::OpponentDisconnected,
            conn,
        );
        self.reset();
        true
    }

    /// Drops every participant and starts a new, empty generation.
    pub fn reset(&mut self) {
        self.slots = Vec::with_capacity(SLOTS);
        self.turn = 0;
        self.phase = Phase::Waiting;
        self.generation += 1;
        tracing::info!(generation = self.generation, "session reset");
    }

    fn send_to_other(&self, slot: usize, msg: &ServerMessage) {
        if let Some(other) = self.slots.get(1 - slot) {
            self.delivery.send_to(&other.outbox, msg);
        }
    }

    fn send_per_slot(&self, msg: impl Fn(usize) -> ServerMessage) {
        for (slot, participant) in self.slots.iter().enumerate() {
            self.delivery.send_to(&participant.outbox, &msg(slot));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutboxReceiver;
    use serde_json::json;

    struct Client {
        outbox: Outbox,
        rx: OutboxReceiver,
    }

    impl Client {
        fn new(id: u64) -> Self {
            let (outbox, rx) = Outbox::channel(ConnectionId::new(id));
            Self { outbox, rx }
        }

        fn id(&self) -> ConnectionId {
            self.outbox.connection_id()
        }

        fn drain(&mut self) -> Vec<ServerMessage> {
            let mut out = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                out.push(serde_json::from_str(&frame).unwrap());
            }
            out
        }
    }

    fn join(session: &mut Session, client: &Client, name: &str) -> PlayerNum {
        session.join(&client.outbox, Identity::from(name))
    }

    /// Two joined players, both committed, messages drained.
    fn active_pair() -> (Session, Client, Client) {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        let mut b = Client::new(2);
        join(&mut session, &a, "A");
        join(&mut session, &b, "B");
        session.mark_ready(a.id()).unwrap();
        session.mark_ready(b.id()).unwrap();
        a.drain();
        b.drain();
        (session, a, b)
    }

    #[test]
    fn test_join_assigns_slots_in_arrival_order() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        let mut b = Client::new(2);

        assert_eq!(join(&mut session, &a, "A"), PlayerNum(1));
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(join(&mut session, &b, "B"), PlayerNum(2));
        assert_eq!(session.phase(), Phase::Armed);

        assert_eq!(
            a.drain(),
            vec![
                ServerMessage::Joined {
                    player_num: PlayerNum(1),
                    identity: "A".into()
                },
                ServerMessage::opponent_joined("B".into()),
            ]
        );
        assert_eq!(
            b.drain(),
            vec![
                ServerMessage::Joined {
                    player_num: PlayerNum(2),
                    identity: "B".into()
                },
                ServerMessage::opponent_joined("A".into()),
            ]
        );
    }

    #[test]
    fn test_third_join_resets_and_refills() {
        let (mut session, _a, _b) = active_pair();
        let mut c = Client::new(3);
        let generation = session.generation();

        assert_eq!(join(&mut session, &c, "C"), PlayerNum(1));

        assert_eq!(session.len(), 1);
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.turn(), None);
        assert_eq!(session.generation(), generation + 1);
        assert_eq!(session.slot_of(ConnectionId::new(1)), None);
        assert_eq!(
            c.drain(),
            vec![ServerMessage::Joined {
                player_num: PlayerNum(1),
                identity: "C".into()
            }]
        );
    }

    #[test]
    fn test_repeat_join_while_waiting_keeps_slot() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        join(&mut session, &a, "A");
        a.drain();

        assert_eq!(join(&mut session, &a, "A2"), PlayerNum(1));
        assert_eq!(session.len(), 1);
        assert_eq!(session.generation(), 0);
        assert_eq!(
            a.drain(),
            vec![ServerMessage::Joined {
                player_num: PlayerNum(1),
                identity: "A".into()
            }]
        );
    }

    #[test]
    fn test_repeat_join_from_seated_connection_when_full_resets() {
        let (mut session, mut a, mut b) = active_pair();

        assert_eq!(join(&mut session, &a, "A"), PlayerNum(1));

        assert_eq!(session.len(), 1);
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.turn(), None);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.slot_of(b.id()), None);
        assert_eq!(session.info().ready, vec![false]);
        assert_eq!(
            a.drain(),
            vec![ServerMessage::Joined {
                player_num: PlayerNum(1),
                identity: "A".into()
            }]
        );
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_mark_ready_unknown_connection_is_rejected() {
        let mut session = Session::new(JsonCodec);
        assert_eq!(
            session.mark_ready(ConnectionId::new(9)),
            Err(SessionError::UnknownConnection(ConnectionId::new(9)))
        );
    }

    #[test]
    fn test_battle_starts_only_when_both_ready() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        let mut b = Client::new(2);
        join(&mut session, &a, "A");
        join(&mut session, &b, "B");
        a.drain();
        b.drain();

        session.mark_ready(a.id()).unwrap();
        assert_eq!(session.phase(), Phase::Armed);
        assert!(a.drain().is_empty());
        assert_eq!(b.drain(), vec![ServerMessage::OpponentReady]);

        session.mark_ready(b.id()).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.turn(), Some(0));
        assert_eq!(
            a.drain(),
            vec![
                ServerMessage::OpponentReady,
                ServerMessage::BattleStart { your_turn: true }
            ]
        );
        assert_eq!(
            b.drain(),
            vec![ServerMessage::BattleStart { your_turn: false }]
        );
    }

    #[test]
    fn test_ready_before_opponent_joins_starts_on_second_commit() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        let mut b = Client::new(2);
        join(&mut session, &a, "A");
        session.mark_ready(a.id()).unwrap();
        assert_eq!(session.phase(), Phase::Waiting);

        join(&mut session, &b, "B");
        session.mark_ready(b.id()).unwrap();

        assert_eq!(session.phase(), Phase::Active);
        assert!(a.drain().contains(&ServerMessage::BattleStart { your_turn: true }));
        assert!(b.drain().contains(&ServerMessage::BattleStart { your_turn: false }));
    }

    #[test]
    fn test_recommit_during_battle_does_not_restart() {
        let (mut session, mut a, mut b) = active_pair();
        session.act(a.id(), json!(4)).unwrap();
        let shot = Resolution::Shot {
            cell_index: json!(4),
            hit: false,
            proof: None,
        };
        session.resolve(b.id(), shot).unwrap();
        a.drain();
        b.drain();

        session.mark_ready(a.id()).unwrap();

        assert_eq!(session.turn(), Some(1));
        assert!(a.drain().is_empty());
        assert_eq!(b.drain(), vec![ServerMessage::OpponentReady]);
    }

    #[test]
    fn test_act_forwards_shot_without_changing_turn() {
        let (mut session, mut a, mut b) = active_pair();

        session.act(a.id(), json!(7)).unwrap();

        assert_eq!(session.turn(), Some(0));
        assert!(a.drain().is_empty());
        assert_eq!(
            b.drain(),
            vec![ServerMessage::IncomingShot {
                cell_index: json!(7),
                from_player: PlayerNum(1)
            }]
        );
    }

    #[test]
    fn test_act_out_of_turn_is_rejected() {
        let (mut session, mut a, mut b) = active_pair();

        assert_eq!(session.act(b.id(), json!(3)), Err(SessionError::NotYourTurn));
        assert!(a.drain().is_empty());
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_act_before_battle_is_rejected() {
        let mut session = Session::new(JsonCodec);
        let a = Client::new(1);
        let b = Client::new(2);
        join(&mut session, &a, "A");
        join(&mut session, &b, "B");

        assert_eq!(session.act(a.id(), json!(0)), Err(SessionError::NotYourTurn));
    }

    #[test]
    fn test_act_from_stranger_is_not_your_turn() {
        let (mut session, _a, _b) = active_pair();
        assert_eq!(
            session.act(ConnectionId::new(99), json!(0)),
            Err(SessionError::NotYourTurn)
        );
    }

    #[test]
    fn test_resolve_shot_flips_turn_and_updates_both() {
        let (mut session, mut a, mut b) = active_pair();
        session.act(a.id(), json!(7)).unwrap();
        b.drain();

        session
            .resolve(
                b.id(),
                Resolution::Shot {
                    cell_index: json!(7),
                    hit: true,
                    proof: Some(json!("0xproof")),
                },
            )
            .unwrap();

        assert_eq!(session.turn(), Some(1));
        assert_eq!(
            a.drain(),
            vec![
                ServerMessage::ShotResolved {
                    cell_index: json!(7),
                    hit: true,
                    proof: Some(json!("0xproof"))
                },
                ServerMessage::TurnUpdate { your_turn: false },
            ]
        );
        assert_eq!(b.drain(), vec![ServerMessage::TurnUpdate { your_turn: true }]);
    }

    #[test]
    fn test_turn_updates_are_mutually_exclusive_across_resolutions() {
        let (mut session, mut a, mut b) = active_pair();
        let clients = [a.id(), b.id()];

        for round in 0..6 {
            let before = session.turn().unwrap();
            let holder = clients[before];
            session.resolve(holder, Resolution::Pass).unwrap();
            let after = session.turn().unwrap();
            assert_eq!(after, 1 - before, "round {round}");

            let a_turn = match a.drain().as_slice() {
                [ServerMessage::TurnUpdate { your_turn }] => *your_turn,
                other => panic!("unexpected {other:?}"),
            };
            let b_turn = match b.drain().as_slice() {
                [ServerMessage::TurnUpdate { your_turn }] => *your_turn,
                other => panic!("unexpected {other:?}"),
            };
            assert_ne!(a_turn, b_turn);
            assert_eq!(a_turn, after == 0);
        }
    }

    #[test]
    fn test_pass_out_of_turn_is_rejected() {
        let (mut session, _a, b) = active_pair();
        assert_eq!(
            session.resolve(b.id(), Resolution::Pass),
            Err(SessionError::NotYourTurn)
        );
        assert_eq!(session.turn(), Some(0));
    }

    #[test]
    fn test_pass_from_stranger_is_unknown_connection() {
        let (mut session, mut a, mut b) = active_pair();
        let stranger = ConnectionId::new(99);

        assert_eq!(
            session.resolve(stranger, Resolution::Pass),
            Err(SessionError::UnknownConnection(stranger))
        );
        assert_eq!(session.turn(), Some(0));
        assert!(a.drain().is_empty());
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_join_kind_passes_authorize_for_newcomer() {
        let mut session = Session::new(JsonCodec);
        let a = Client::new(1);
        join(&mut session, &a, "A");

        assert_eq!(
            session.authorize(ConnectionId::new(2), MessageKind::Join),
            Ok(1)
        );
        assert_eq!(
            session.authorize(ConnectionId::new(2), MessageKind::TcgAction),
            Err(SessionError::UnknownConnection(ConnectionId::new(2)))
        );
    }

    #[test]
    fn test_shot_result_outside_battle_is_invalid_phase() {
        let mut session = Session::new(JsonCodec);
        let a = Client::new(1);
        let b = Client::new(2);
        join(&mut session, &a, "A");
        join(&mut session, &b, "B");

        let result = session.resolve(
            b.id(),
            Resolution::Shot {
                cell_index: json!(0),
                hit: false,
                proof: None,
            },
        );
        assert_eq!(
            result,
            Err(SessionError::InvalidPhase {
                kind: MessageKind::ShotResult,
                phase: Phase::Armed
            })
        );
    }

    #[test]
    fn test_relay_forwards_verbatim_without_touching_turn() {
        let (mut session, mut a, mut b) = active_pair();
        let payload = json!({"card": {"id": 3, "cost": 2}});

        session
            .relay(b.id(), "play_card".into(), Some(payload.clone()))
            .unwrap();

        assert_eq!(session.turn(), Some(0));
        assert_eq!(session.phase(), Phase::Active);
        assert!(b.drain().is_empty());
        assert_eq!(
            a.drain(),
            vec![ServerMessage::TcgAction {
                action: "play_card".into(),
                payload: Some(payload)
            }]
        );
    }

    #[test]
    fn test_relay_to_empty_slot_is_a_no_op() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        join(&mut session, &a, "A");
        a.drain();

        session.relay(a.id(), "draw".into(), None).unwrap();
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_declare_winner_keeps_slots_and_allows_rematch() {
        let (mut session, mut a, mut b) = active_pair();

        session.declare_winner(a.id()).unwrap();

        assert_eq!(session.phase(), Phase::Ended);
        assert_eq!(session.len(), 2);
        assert_eq!(session.turn(), None);
        assert!(session.participants().iter().all(|p| !p.is_ready()));
        assert!(a.drain().is_empty());
        assert_eq!(
            b.drain(),
            vec![ServerMessage::YouLost {
                winner_address: "A".into()
            }]
        );

        // No turn-changing actions until a new ready cycle completes.
        assert_eq!(session.act(a.id(), json!(1)), Err(SessionError::NotYourTurn));

        session.mark_ready(b.id()).unwrap();
        session.mark_ready(a.id()).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.turn(), Some(0));
        assert!(a.drain().contains(&ServerMessage::BattleStart { your_turn: true }));
    }

    #[test]
    fn test_declare_winner_alone_stays_waiting() {
        let mut session = Session::new(JsonCodec);
        let mut a = Client::new(1);
        join(&mut session, &a, "A");
        session.mark_ready(a.id()).unwrap();
        a.drain();

        session.declare_winner(a.id()).unwrap();

        assert_eq!(session.phase(), Phase::Waiting);
        assert!(a.drain().is_empty());
        assert!(!session.participants()[0].is_ready());
    }

    #[test]
    fn test_disconnect_notifies_remaining_and_resets() {
        let (mut session, mut a, mut b) = active_pair();
        let generation = session.generation();

        assert!(session.disconnect(b.id()));

        assert_eq!(a.drain(), vec![ServerMessage::OpponentDisconnected]);
        assert!(b.drain().is_empty());
        assert!(session.is_empty());
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.generation(), generation + 1);
    }

    #[test]
    fn test_disconnect_of_stranger_leaves_session_alone() {
        let (mut session, mut a, _b) = active_pair();

        assert!(!session.disconnect(ConnectionId::new(42)));

        assert_eq!(session.len(), 2);
        assert_eq!(session.phase(), Phase::Active);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_info_reports_turn_only_while_active() {
        let (mut session, a, _b) = active_pair();
        let info = session.info();
        assert_eq!(info.phase, Phase::Active);
        assert_eq!(info.players, vec![Identity::from("A"), Identity::from("B")]);
        assert_eq!(info.ready, vec![true, true]);
        assert_eq!(info.turn, Some(PlayerNum(1)));

        session.declare_winner(a.id()).unwrap();
        assert_eq!(session.info().turn, None);
    }
}
