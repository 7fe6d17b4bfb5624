//! One-shot game events for presentation layers.
//!
//! Commands and ticks record events into a fixed-capacity ring buffer. The
//! caller drains them in emission order, usually once per frame. When the
//! buffer is full the oldest event is dropped.
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]; suppressed
//! events are never recorded.

use crate::id::{PowerId, ShopItemId, WorkerId};
use crate::numeric::Ticks;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A game event. All events carry the tick during which they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Event {
    /// A click rolled a critical hit; `value` is the final credited amount.
    CriticalHit { value: f64, tick: Ticks },
    WorkerUpgraded {
        worker: WorkerId,
        level: u32,
        price: f64,
        tick: Ticks,
    },
    ShopItemBought {
        item: ShopItemId,
        price: f64,
        tick: Ticks,
    },
    PowerCast {
        power: PowerId,
        mana_spent: f64,
        tick: Ticks,
    },
    StreakActivated { tick: Ticks },
    StreakDepleted { tick: Ticks },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CriticalHit,
    WorkerUpgraded,
    ShopItemBought,
    PowerCast,
    StreakActivated,
    StreakDepleted,
}

const EVENT_KIND_COUNT: usize = 6;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CriticalHit { .. } => EventKind::CriticalHit,
            Event::WorkerUpgraded { .. } => EventKind::WorkerUpgraded,
            Event::ShopItemBought { .. } => EventKind::ShopItemBought,
            Event::PowerCast { .. } => EventKind::PowerCast,
            Event::StreakActivated { .. } => EventKind::StreakActivated,
            Event::StreakDepleted { .. } => EventKind::StreakDepleted,
        }
    }

    pub fn tick(&self) -> Ticks {
        match *self {
            Event::CriticalHit { tick, .. }
            | Event::WorkerUpgraded { tick, .. }
            | Event::ShopItemBought { tick, .. }
            | Event::PowerCast { tick, .. }
            | Event::StreakActivated { tick }
            | Event::StreakDepleted { tick } => tick,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    fn oldest(&self) -> usize {
        if self.len < self.capacity() {
            (self.head + self.capacity() - self.len) % self.capacity()
        } else {
            // head points to the next write position, which is the oldest entry
            self.head
        }
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let start = self.oldest();
        (0..self.len).filter_map(move |i| self.events[(start + i) % self.capacity()].as_ref())
    }

    /// Remove and return every stored event, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        let start = self.oldest();
        let capacity = self.capacity();
        let drained = (0..self.len)
            .filter_map(|i| self.events[(start + i) % capacity].take())
            .collect();
        self.head = 0;
        self.len = 0;
        drained
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One ring buffer shared by all kinds, plus per-kind suppression flags.
#[derive(Debug)]
pub struct EventBus {
    buffer: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity),
            suppressed: [false; EVENT_KIND_COUNT],
        }
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event unless its kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.buffer.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.buffer.drain()
    }
}
