use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

use crate::category::Category;
use crate::clock::ManualClock;
use crate::content::FormattedText;
use crate::events::{CardEvent, CardEventKind, CategoryEventKind, CategoryObserver};
use crate::review::ExpirationPolicy;

/// Fixed reference instant used across tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

pub fn text(plain: &str) -> FormattedText {
    FormattedText::unformatted(plain)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenCardEvent {
    pub kind: CardEventKind,
    pub card: Uuid,
    pub category: Uuid,
    pub level: u32,
}

/// Category observer that records everything it sees.
#[derive(Default)]
pub struct RecordingObserver {
    pub cards: RefCell<Vec<SeenCardEvent>>,
    pub categories: RefCell<Vec<(CategoryEventKind, Uuid)>>,
}

impl RecordingObserver {
    pub fn kinds(&self) -> Vec<CardEventKind> {
        self.cards.borrow().iter().map(|seen| seen.kind).collect()
    }

    pub fn count(&self, kind: CardEventKind) -> usize {
        self.cards.borrow().iter().filter(|seen| seen.kind == kind).count()
    }

    pub fn clear(&self) {
        self.cards.borrow_mut().clear();
        self.categories.borrow_mut().clear();
    }
}

impl CategoryObserver for RecordingObserver {
    fn on_card_event(&self, event: &CardEvent<'_>) {
        self.cards.borrow_mut().push(SeenCardEvent {
            kind: event.kind,
            card: event.card.id(),
            category: event.category,
            level: event.level,
        });
    }

    fn on_category_event(&self, kind: CategoryEventKind, category: Uuid) {
        self.categories.borrow_mut().push((kind, category));
    }
}

/// Every level expires the same fixed distance after testing.
pub struct FixedInterval(pub Duration);

impl ExpirationPolicy for FixedInterval {
    fn expiration_for(&self, _level: u32, tested_at: DateTime<Utc>) -> DateTime<Utc> {
        tested_at + self.0
    }
}

/// A root category on a manual clock starting at [`t0`], with a recorder attached.
pub struct TestEnv {
    pub clock: Rc<ManualClock>,
    pub root: Category,
    pub recorder: Rc<RecordingObserver>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let clock = Rc::new(ManualClock::new(t0()));
        let root = Category::new("All", clock.clone());
        let recorder = Rc::new(RecordingObserver::default());
        root.add_observer(recorder.clone());
        Self {
            clock,
            root,
            recorder,
        }
    }
}
