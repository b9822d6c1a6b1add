//! # Container Events
//!
//! Cards do not know who cares about their changes. They report to the
//! category that owns them, and the category relays each event to whoever
//! registered interest: its own observers first, then every ancestor
//! category's, up to the root (where a [`crate::lesson::Lesson`] usually
//! listens).
//!
//! ## Event Kinds
//!
//! | Kind | Raised by | Meaning |
//! |------|-----------|---------|
//! | `Edited` | card | side text or images changed |
//! | `Deck` | card, category, review | level, expiration or per-side counters changed |
//! | `Expired` | [`crate::category::Category::sweep_expired`] | a due time passed; nothing was mutated |
//! | `Added` | category | card entered a category |
//! | `Removed` | category | card left a category |
//!
//! ## Ownership Back-Reference
//!
//! An attached card holds a [`ContainerRef`]: the owning category's id plus a
//! `Weak` handle to that category's [`EventHub`]. The card can fire events and
//! read the hub's clock through it but never owns or mutates the category.
//! Only the category sets or clears it.
//!
//! ## Delivery
//!
//! Delivery is synchronous. The hub snapshots its observer list before
//! iterating, so an observer may register or remove observers while handling
//! an event.

use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

use crate::card::Card;
use crate::clock::TimeSource;

/// Token returned when registering an observer, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardEventKind {
    Edited,
    Deck,
    Expired,
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryEventKind {
    Added,
    Removed,
}

/// A card change as seen by category observers.
#[derive(Debug, Clone, Copy)]
pub struct CardEvent<'a> {
    pub kind: CardEventKind,
    pub card: &'a Card,
    pub category: Uuid,
    pub level: u32,
}

pub trait CategoryObserver {
    fn on_card_event(&self, event: &CardEvent<'_>);

    fn on_category_event(&self, _kind: CategoryEventKind, _category: Uuid) {}
}

/// Per-category event relay.
pub struct EventHub {
    category: Uuid,
    clock: Rc<dyn TimeSource>,
    parent: RefCell<Option<Weak<EventHub>>>,
    observers: RefCell<Vec<(ObserverId, Rc<dyn CategoryObserver>)>>,
    next_observer: Cell<u64>,
}

impl EventHub {
    pub(crate) fn new(
        category: Uuid,
        clock: Rc<dyn TimeSource>,
        parent: Option<Weak<EventHub>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            category,
            clock,
            parent: RefCell::new(parent),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        })
    }

    pub fn category(&self) -> Uuid {
        self.category
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn clock(&self) -> Rc<dyn TimeSource> {
        Rc::clone(&self.clock)
    }

    pub(crate) fn set_parent(&self, parent: Option<Weak<EventHub>>) {
        *self.parent.borrow_mut() = parent;
    }

    pub(crate) fn add_observer(&self, observer: Rc<dyn CategoryObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    pub(crate) fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(registered, _)| *registered != id);
        observers.len() != before
    }

    pub(crate) fn fire_card_event(&self, event: &CardEvent<'_>) {
        for observer in self.snapshot() {
            observer.on_card_event(event);
        }
        if let Some(parent) = self.parent() {
            parent.fire_card_event(event);
        }
    }

    pub(crate) fn fire_category_event(&self, kind: CategoryEventKind, category: Uuid) {
        for observer in self.snapshot() {
            observer.on_category_event(kind, category);
        }
        if let Some(parent) = self.parent() {
            parent.fire_category_event(kind, category);
        }
    }

    fn snapshot(&self) -> Vec<Rc<dyn CategoryObserver>> {
        self.observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect()
    }

    fn parent(&self) -> Option<Rc<EventHub>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("category", &self.category)
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

/// A card's handle on the category that owns it.
#[derive(Debug, Clone)]
pub struct ContainerRef {
    category: Uuid,
    hub: Weak<EventHub>,
}

impl ContainerRef {
    pub(crate) fn new(hub: &Rc<EventHub>) -> Self {
        Self {
            category: hub.category(),
            hub: Rc::downgrade(hub),
        }
    }

    pub fn category(&self) -> Uuid {
        self.category
    }

    /// Current time on the owning category's clock, if the category is alive.
    pub(crate) fn now(&self) -> Option<DateTime<Utc>> {
        self.hub.upgrade().map(|hub| hub.now())
    }

    pub(crate) fn fire(&self, kind: CardEventKind, card: &Card) {
        match self.hub.upgrade() {
            Some(hub) => {
                let event = CardEvent {
                    kind,
                    card,
                    category: self.category,
                    level: card.level(),
                };
                hub.fire_card_event(&event);
            }
            None => {
                tracing::warn!(
                    card = %card.id(),
                    category = %self.category,
                    ?kind,
                    "owning category is gone, dropping card event"
                );
            }
        }
    }
}
