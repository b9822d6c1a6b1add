#![allow(dead_code)]

use cardbox::{CardEvent, CardEventKind, Category, CategoryEventKind, CategoryObserver, ManualClock};
use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

#[derive(Default)]
pub struct Recorder {
    pub cards: RefCell<Vec<(CardEventKind, Uuid, u32)>>,
    pub categories: RefCell<Vec<CategoryEventKind>>,
}

impl Recorder {
    pub fn count(&self, kind: CardEventKind) -> usize {
        self.cards.borrow().iter().filter(|(k, _, _)| *k == kind).count()
    }

    pub fn total(&self) -> usize {
        self.cards.borrow().len()
    }

    pub fn clear(&self) {
        self.cards.borrow_mut().clear();
        self.categories.borrow_mut().clear();
    }
}

impl CategoryObserver for Recorder {
    fn on_card_event(&self, event: &CardEvent<'_>) {
        self.cards
            .borrow_mut()
            .push((event.kind, event.card.id(), event.level));
    }

    fn on_category_event(&self, kind: CategoryEventKind, _category: Uuid) {
        self.categories.borrow_mut().push(kind);
    }
}

/// Root category on a manual clock at [`t0`] with a recorder attached.
pub fn observed_root() -> (Rc<ManualClock>, Category, Rc<Recorder>) {
    let clock = Rc::new(ManualClock::new(t0()));
    let root = Category::new("All", clock.clone());
    let recorder = Rc::new(Recorder::default());
    root.add_observer(recorder.clone());
    (clock, root, recorder)
}
