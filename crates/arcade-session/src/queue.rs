//! FIFO matchmaking for one game kind.
//!
//! # How pairing works
//!
//! ```text
//! handler A ── enqueue("alice") ──┐
//!                                 ├─▶ [lock] two waiting? pop both ──▶ Pairing ──▶ dispatcher
//! handler B ── enqueue("bob") ────┘        │
//!                                          ├─▶ Matched{First,  "bob"}   ──▶ ticket A
//!                                          └─▶ Matched{Second, "alice"} ──▶ ticket B
//! ```
//!
//! Pairing happens inside `enqueue`, under the queue's lock, the moment
//! a second player arrives. Nobody polls. The pairing goes to the
//! dispatcher over a channel, and each player's handler learns about it
//! through its [`Ticket`].
//!
//! Each handler then moves its player (connection and all) into the
//! pairing with [`Matched::take_seat`]. The dispatcher calls
//! [`Pairing::assemble`] to collect both and start the game.
//!
//! # Disconnects while waiting
//!
//! A handler keeps reading its connection while it waits. When the
//! connection dies it calls [`MatchmakingQueue::cancel`], which removes
//! the entry under the same lock used for pairing, so a dead player is
//! never paired. If a player dies in the short window after pairing but
//! before taking their seat, [`Pairing::assemble`] reports the seat as
//! missing and the survivor can be told the match ended abruptly.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use arcade_protocol::{GameKind, Seat};
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::SessionError;

/// Identifies one waiting entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId(u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

struct Waiting<P> {
    ticket: TicketId,
    username: String,
    notify: oneshot::Sender<Matched<P>>,
}

/// A player's claim on a place in the queue.
///
/// Await [`matched`](Self::matched) to learn when an opponent is found.
pub struct Ticket<P> {
    id: TicketId,
    matched: oneshot::Receiver<Matched<P>>,
}

impl<P> Ticket<P> {
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// The notification future. Borrow it mutably to use it in
    /// `tokio::select!` without giving up the ticket.
    pub fn matched(&mut self) -> &mut oneshot::Receiver<Matched<P>> {
        &mut self.matched
    }
}

/// Delivered to a waiting player when an opponent is found.
pub struct Matched<P> {
    /// The seat this player was given.
    pub seat: Seat,
    /// The opponent's display name.
    pub opponent: String,
    seat_tx: oneshot::Sender<P>,
}

impl<P> fmt::Debug for Matched<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matched")
            .field("seat", &self.seat)
            .field("opponent", &self.opponent)
            .finish_non_exhaustive()
    }
}

impl<P> Matched<P> {
    /// Hands the player over to the pairing.
    ///
    /// Returns the player back if the pairing was already dropped.
    pub fn take_seat(self, player: P) -> Result<(), P> {
        self.seat_tx.send(player)
    }
}

/// Two players paired for one match, delivered to the dispatcher.
pub struct Pairing<P> {
    pub kind: GameKind,
    /// Display names, indexed by seat.
    pub usernames: [String; 2],
    seats: [oneshot::Receiver<P>; 2],
}

/// What [`Pairing::assemble`] managed to collect.
pub enum Assembled<P> {
    /// Both players took their seats, indexed by seat.
    Both([P; 2]),
    /// Only one player showed up.
    Partial(Seat, P),
    /// Neither did.
    Empty,
}

impl<P> Pairing<P> {
    /// Waits for both handlers to hand their players over.
    ///
    /// A seat whose handler went away resolves immediately as missing.
    pub async fn assemble(self) -> Assembled<P> {
        let [first, second] = self.seats;
        let (first, second) = tokio::join!(first, second);
        match (first.ok(), second.ok()) {
            (Some(a), Some(b)) => Assembled::Both([a, b]),
            (Some(a), None) => Assembled::Partial(Seat::First, a),
            (None, Some(b)) => Assembled::Partial(Seat::Second, b),
            (None, None) => Assembled::Empty,
        }
    }
}

/// Waiting room for one game kind.
///
/// Constructed explicitly and shared by handlers through an `Arc`. The
/// matching [`Pairing`] receiver goes to the dispatcher for that kind.
pub struct MatchmakingQueue<P> {
    kind: GameKind,
    waiting: Mutex<VecDeque<Waiting<P>>>,
    pairings: mpsc::UnboundedSender<Pairing<P>>,
    next_ticket: AtomicU64,
}

impl<P: Send + 'static> MatchmakingQueue<P> {
    /// Creates a queue and the receiver its pairings are delivered on.
    pub fn new(kind: GameKind) -> (Self, mpsc::UnboundedReceiver<Pairing<P>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Self {
            kind,
            waiting: Mutex::new(VecDeque::new()),
            pairings: tx,
            next_ticket: AtomicU64::new(1),
        };
        (queue, rx)
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Number of players currently waiting.
    pub async fn len(&self) -> usize {
        self.waiting.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Adds a player to the back of the queue.
    ///
    /// If this makes two live players wait, the two oldest are removed
    /// and paired before the lock is released. The earlier arrival gets
    /// [`Seat::First`].
    ///
    /// # Errors
    /// [`SessionError::QueueClosed`] if the dispatcher has stopped.
    pub async fn enqueue(&self, username: &str) -> Result<Ticket<P>, SessionError> {
        let id = TicketId(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        let (notify, matched) = oneshot::channel();

        let mut waiting = self.waiting.lock().await;
        if self.pairings.is_closed() {
            return Err(SessionError::QueueClosed(self.kind));
        }

        waiting.push_back(Waiting {
            ticket: id,
            username: username.to_string(),
            notify,
        });
        tracing::info!(kind = %self.kind, ticket = %id, %username, "player queued");

        // Entries whose handler vanished without cancelling are skipped.
        waiting.retain(|w| !w.notify.is_closed());
        if waiting.len() >= 2 {
            if let (Some(first), Some(second)) = (waiting.pop_front(), waiting.pop_front()) {
                self.pair(first, second);
            }
        }

        Ok(Ticket { id, matched })
    }

    /// Removes a waiting player. Returns `false` if the ticket was already
    /// paired (or never queued).
    pub async fn cancel(&self, ticket: TicketId) -> bool {
        let mut waiting = self.waiting.lock().await;
        let before = waiting.len();
        waiting.retain(|w| w.ticket != ticket);
        let removed = waiting.len() != before;
        if removed {
            tracing::info!(kind = %self.kind, %ticket, "player left the queue");
        }
        removed
    }

    /// Notifies both players and hands the pairing to the dispatcher.
    /// Called with the queue lock held.
    fn pair(&self, first: Waiting<P>, second: Waiting<P>) {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();

        tracing::info!(
            kind = %self.kind,
            first = %first.username,
            second = %second.username,
            "paired players"
        );

        let pairing = Pairing {
            kind: self.kind,
            usernames: [first.username.clone(), second.username.clone()],
            seats: [first_rx, second_rx],
        };
        if self.pairings.send(pairing).is_err() {
            tracing::warn!(kind = %self.kind, "dispatcher gone; pairing dropped");
        }

        // A failed notify drops the seat sender, which `assemble` reports
        // as a missing player.
        let _ = first.notify.send(Matched {
            seat: Seat::First,
            opponent: second.username,
            seat_tx: first_tx,
        });
        let _ = second.notify.send(Matched {
            seat: Seat::Second,
            opponent: first.username,
            seat_tx: second_tx,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_one_player_waits() {
        let (queue, mut rx) = MatchmakingQueue::<u32>::new(GameKind::WordGolf);
        let _ticket = queue.enqueue("alice").await.unwrap();
        assert_eq!(queue.len().await, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enqueue_two_players_pairs_once_with_distinct_seats() {
        let (queue, mut rx) = MatchmakingQueue::<u32>::new(GameKind::Stratego);
        let mut a = queue.enqueue("alice").await.unwrap();
        let mut b = queue.enqueue("bob").await.unwrap();

        assert!(queue.is_empty().await);

        let pairing = rx.try_recv().expect("one pairing");
        assert!(rx.try_recv().is_err());
        assert_eq!(pairing.usernames, ["alice".to_string(), "bob".to_string()]);

        let ma = a.matched().await.unwrap();
        let mb = b.matched().await.unwrap();
        assert_eq!(ma.seat, Seat::First);
        assert_eq!(ma.opponent, "bob");
        assert_eq!(mb.seat, Seat::Second);
        assert_eq!(mb.opponent, "alice");
    }

    #[tokio::test]
    async fn test_assemble_collects_both_seats_in_order() {
        let (queue, mut rx) = MatchmakingQueue::<&'static str>::new(GameKind::WordGolf);
        let mut a = queue.enqueue("alice").await.unwrap();
        let mut b = queue.enqueue("bob").await.unwrap();
        let pairing = rx.try_recv().unwrap();

        // Hand over in reverse order; seats still come back indexed.
        b.matched().await.unwrap().take_seat("B").unwrap();
        a.matched().await.unwrap().take_seat("A").unwrap();

        match pairing.assemble().await {
            Assembled::Both(players) => assert_eq!(players, ["A", "B"]),
            _ => panic!("expected both players"),
        }
    }

    #[tokio::test]
    async fn test_assemble_abandoned_seat_is_partial() {
        let (queue, mut rx) = MatchmakingQueue::<u32>::new(GameKind::WordGolf);
        let mut a = queue.enqueue("alice").await.unwrap();
        let b = queue.enqueue("bob").await.unwrap();
        let pairing = rx.try_recv().unwrap();

        a.matched().await.unwrap().take_seat(1).unwrap();
        drop(b);

        match pairing.assemble().await {
            Assembled::Partial(seat, player) => {
                assert_eq!(seat, Seat::First);
                assert_eq!(player, 1);
            }
            _ => panic!("expected a partial pairing"),
        }
    }

    #[tokio::test]
    async fn test_cancel_removes_waiting_player() {
        let (queue, mut rx) = MatchmakingQueue::<u32>::new(GameKind::SecretGame);
        let a = queue.enqueue("alice").await.unwrap();
        assert!(queue.cancel(a.id()).await);
        assert!(queue.is_empty().await);

        // The next two arrivals pair with each other, not with alice.
        let _b = queue.enqueue("bob").await.unwrap();
        let _c = queue.enqueue("carol").await.unwrap();
        let pairing = rx.try_recv().unwrap();
        assert_eq!(pairing.usernames, ["bob".to_string(), "carol".to_string()]);
    }

    #[tokio::test]
    async fn test_enqueue_skips_dropped_ticket() {
        let (queue, mut rx) = MatchmakingQueue::<u32>::new(GameKind::WordGolf);
        let a = queue.enqueue("alice").await.unwrap();
        drop(a);
        let _b = queue.enqueue("bob").await.unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_after_pairing_returns_false() {
        let (queue, _rx) = MatchmakingQueue::<u32>::new(GameKind::WordGolf);
        let a = queue.enqueue("alice").await.unwrap();
        let _b = queue.enqueue("bob").await.unwrap();
        assert!(!queue.cancel(a.id()).await);
    }

    #[tokio::test]
    async fn test_enqueue_after_dispatcher_dropped_is_closed() {
        let (queue, rx) = MatchmakingQueue::<u32>::new(GameKind::Stratego);
        drop(rx);
        let err = queue.enqueue("alice").await.err().unwrap();
        assert!(matches!(err, SessionError::QueueClosed(GameKind::Stratego)));
    }
}
