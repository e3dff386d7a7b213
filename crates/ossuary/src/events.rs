//! # Simulation Notifications
//!
//! Fire-once lifecycle signals for the presentation and audio layers.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌──────────────────┐
//! │   World     │─────>│   Bounded   │─────>│  Audio / Camera  │
//! │   (tick)    │      │   Channel   │      │  UI / Scenes     │
//! └─────────────┘      └─────────────┘      └──────────────────┘
//! ```
//!
//! The tick never blocks on a slow consumer: when the channel is full the
//! notification is dropped and a warning is logged.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use ossuary_shared::Vec2;

use crate::combat::ProjectileKind;

/// Hero abilities, as reported in [`SimEvent::AttackFired`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attack {
    /// Melee slash.
    Swipe,
    /// Three-orb volley.
    Orb,
    /// Invincible dash.
    Dash,
    /// Kills several mobs at random.
    HandOfDeath,
    /// Spear erupting at the aim point.
    BoneSpear,
}

/// Notifications emitted by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// An ability was triggered.
    ///
    /// Consumed by: audio, camera shake
    AttackFired {
        /// Which ability.
        attack: Attack,
        /// Hero position when it fired.
        position: Vec2,
    },

    /// The hero took a hit.
    HeroHit {
        /// Health left after the hit.
        health_remaining: i32,
        /// Direction the hit pushed the hero, in radians.
        angle: f32,
    },

    /// The death animation finished; the run is over.
    HeroDied {
        /// Where the hero fell.
        position: Vec2,
    },

    /// A mob died.
    MobKilled {
        /// Mob pool slot that is about to be recycled.
        slot: usize,
        /// Where it died.
        position: Vec2,
    },

    /// Collected souls crossed a level threshold.
    LevelUp {
        /// New level, starting at 1 for the first threshold.
        level: u32,
        /// Souls collected so far.
        souls: u32,
    },

    /// An attack was dropped because its projectile pool was exhausted.
    PoolExhausted {
        /// Pool that ran dry.
        kind: ProjectileKind,
    },
}

/// Bounded notification channel.
///
/// Pre-allocates its buffer so the tick never grows it.
pub struct EventBus {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a connected sender and receiver.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for emitting notifications.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<SimEvent>,
}

impl EventSender {
    /// Emits a notification without blocking.
    ///
    /// Returns `false` if it was dropped because the channel is full or
    /// every receiver is gone.
    #[inline]
    pub fn send(&self, event: SimEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "event channel full, notification dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for consuming notifications.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<SimEvent>,
}

impl EventReceiver {
    /// Takes every pending notification.
    #[inline]
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one pending notification.
    #[inline]
    pub fn try_recv(&self) -> Option<SimEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending notifications.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if anything is pending.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
