//! # Lessons
//!
//! A [`Lesson`] is what a user opens and saves: the root category (named
//! `All`) plus two pieces of bookkeeping that listen to it.
//!
//! - **Save-needed flag** ([`Lesson::can_save`]): set by any card event except
//!   `Expired`, and by any category event. An expiry sweep reports the passage
//!   of time and changes nothing that would need saving.
//! - **Learn history** ([`Lesson::history`]): one entry per `Deck` event, so a
//!   session's level changes can be reviewed afterwards.
//!
//! Persisting a lesson is the caller's business. [`Lesson::file`] only
//! remembers where it came from.

use chrono::{DateTime, Utc};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use uuid::Uuid;

use crate::category::{Category, CategoryMut};
use crate::clock::TimeSource;
use crate::events::{CardEvent, CardEventKind, CategoryEventKind, CategoryObserver, ObserverId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub card: Uuid,
    pub category: Uuid,
    pub level: u32,
}

/// Deck movements in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnHistory {
    entries: Vec<HistoryEntry>,
}

impl LearnHistory {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_card(&self, card: Uuid) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.card == card)
    }

    fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }
}

struct LessonState {
    can_save: Cell<bool>,
    history: RefCell<LearnHistory>,
    clock: Rc<dyn TimeSource>,
}

impl LessonState {
    fn mark_dirty(&self) {
        if !self.can_save.replace(true) {
            tracing::trace!("lesson has unsaved changes");
        }
    }
}

impl CategoryObserver for LessonState {
    fn on_card_event(&self, event: &CardEvent<'_>) {
        if event.kind == CardEventKind::Expired {
            return;
        }
        if event.kind == CardEventKind::Deck {
            self.history.borrow_mut().record(HistoryEntry {
                at: self.clock.now(),
                card: event.card.id(),
                category: event.category,
                level: event.level,
            });
        }
        self.mark_dirty();
    }

    fn on_category_event(&self, _kind: CategoryEventKind, _category: Uuid) {
        self.mark_dirty();
    }
}

pub struct Lesson {
    root: Category,
    state: Rc<LessonState>,
    observer: ObserverId,
    file: Option<PathBuf>,
}

impl Lesson {
    /// An empty lesson with a root category named `All`.
    pub fn new(clock: Rc<dyn TimeSource>) -> Self {
        Self::with_root(Category::new("All", clock), false)
    }

    pub fn with_root(root: Category, can_save: bool) -> Self {
        let state = Rc::new(LessonState {
            can_save: Cell::new(can_save),
            history: RefCell::new(LearnHistory::default()),
            clock: root.clock(),
        });
        let observer = root.add_observer(state.clone());
        Self {
            root,
            state,
            observer,
            file: None,
        }
    }

    pub fn can_save(&self) -> bool {
        self.state.can_save.get()
    }

    /// Typically cleared by the caller right after a successful save.
    pub fn set_can_save(&self, can_save: bool) {
        self.state.can_save.set(can_save);
    }

    pub fn root(&self) -> &Category {
        &self.root
    }

    pub fn root_mut(&mut self) -> CategoryMut<'_> {
        CategoryMut(&mut self.root)
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn set_file(&mut self, file: Option<PathBuf>) {
        self.file = file;
    }

    pub fn history(&self) -> Ref<'_, LearnHistory> {
        self.state.history.borrow()
    }

    /// Same categories and card content, all progress reset. The copy has no
    /// file and needs saving.
    pub fn clone_without_progress(&self) -> Lesson {
        Lesson::with_root(self.root.clone_without_progress(), true)
    }

    fn card_ids(&self) -> Vec<Uuid> {
        self.root.all_cards().iter().map(|card| card.id()).collect()
    }
}

impl Drop for Lesson {
    fn drop(&mut self) {
        self.root.remove_observer(self.observer);
    }
}

impl PartialEq for Lesson {
    fn eq(&self, other: &Self) -> bool {
        self.card_ids() == other.card_ids()
    }
}

impl fmt::Debug for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lesson")
            .field("root", &self.root.id())
            .field("can_save", &self.can_save())
            .field("file", &self.file)
            .finish()
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "Lesson({})", file.display()),
            None => write!(f, "Lesson(none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Face};
    use crate::clock::ManualClock;
    use crate::review::{grade, Outcome};
    use crate::test_utils::{t0, text, FixedInterval};
    use chrono::Duration;

    fn setup() -> (Rc<ManualClock>, Lesson) {
        let clock = Rc::new(ManualClock::new(t0()));
        let lesson = Lesson::new(clock.clone());
        (clock, lesson)
    }

    fn card(front: &str) -> Card {
        Card::with_created(t0(), text(front), text("back"))
    }

    #[test]
    fn test_new_lesson_is_clean() {
        let (_clock, lesson) = setup();
        assert!(!lesson.can_save());
        assert_eq!(lesson.root().name(), "All");
        assert!(lesson.history().is_empty());
        assert!(lesson.file().is_none());
    }

    #[test]
    fn test_adding_card_marks_dirty() {
        let (_clock, mut lesson) = setup();
        lesson.root_mut().add_card(card("q")).unwrap();
        assert!(lesson.can_save());
    }

    #[test]
    fn test_category_change_marks_dirty() {
        let (_clock, mut lesson) = setup();
        lesson.root_mut().add_child("Verbs");
        assert!(lesson.can_save());
    }

    #[test]
    fn test_events_from_child_categories_reach_lesson() {
        let (_clock, mut lesson) = setup();
        let child = lesson.root_mut().add_child("Verbs").id();
        lesson.set_can_save(false);

        let mut category = lesson.root_mut().find_mut(child).unwrap();
        let id = category.add_card(card("q")).unwrap();
        assert!(lesson.can_save());

        lesson.set_can_save(false);
        lesson
            .root_mut()
            .find_card_mut(id)
            .unwrap()
            .set_sides_text("new", "back")
            .unwrap();
        assert!(lesson.can_save());
    }

    #[test]
    fn test_expiry_sweep_does_not_mark_dirty() {
        let (clock, mut lesson) = setup();
        let id = lesson.root_mut().add_card(card("q")).unwrap();
        let policy = FixedInterval(Duration::hours(1));
        let graded = lesson.root_mut().card_mut(id).unwrap();
        grade(graded, Face::Front, Outcome::Passed, &policy, &*clock);
        lesson.set_can_save(false);

        clock.advance(Duration::hours(2));
        assert_eq!(lesson.root_mut().sweep_expired(), 1);
        assert!(!lesson.can_save());
    }

    #[test]
    fn test_deck_events_recorded_in_history() {
        let (clock, mut lesson) = setup();
        let id = lesson.root_mut().add_card(card("q")).unwrap();
        let policy = FixedInterval(Duration::days(1));

        let target = lesson.root_mut().card_mut(id).unwrap();
        grade(target, Face::Front, Outcome::Passed, &policy, &*clock);
        clock.advance(Duration::days(2));
        let target = lesson.root_mut().card_mut(id).unwrap();
        grade(target, Face::Back, Outcome::Failed, &policy, &*clock);

        let history = lesson.history();
        let levels: Vec<u32> = history.for_card(id).map(|entry| entry.level).collect();
        assert_eq!(levels, vec![1, 0]);
        assert_eq!(history.entries()[1].at, t0() + Duration::days(2));
        assert_eq!(history.entries()[0].category, lesson.root().id());
    }

    #[test]
    fn test_edits_are_not_history() {
        let (_clock, mut lesson) = setup();
        let id = lesson.root_mut().add_card(card("q")).unwrap();
        lesson
            .root_mut()
            .card_mut(id)
            .unwrap()
            .set_sides_text("q2", "back")
            .unwrap();
        assert!(lesson.history().is_empty());
    }

    #[test]
    fn test_clone_without_progress() {
        let (clock, mut lesson) = setup();
        lesson.set_file(Some(PathBuf::from("/tmp/words.jml")));
        let verbs = lesson.root_mut().add_child("Verbs").id();
        let id = lesson
            .root_mut()
            .find_mut(verbs)
            .unwrap()
            .add_card(card("run"))
            .unwrap();
        let target = lesson.root_mut().find_card_mut(id).unwrap();
        grade(
            target,
            Face::Front,
            Outcome::Passed,
            &FixedInterval(Duration::days(1)),
            &*clock,
        );

        let copy = lesson.clone_without_progress();
        assert!(copy.can_save());
        assert!(copy.file().is_none());
        assert!(copy.history().is_empty());
        assert_eq!(copy.root().children()[0].name(), "Verbs");

        let copied = copy.root().all_cards();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].level(), 0);
        assert_eq!(copied[0].tests_total(), 0);
        assert_eq!(copied[0].date_created(), t0());
        assert_eq!(
            copied[0].front().text(),
            lesson.root().find_card(id).unwrap().front().text()
        );
    }

    #[test]
    fn test_copy_listens_to_its_own_root() {
        let (_clock, lesson) = setup();
        let mut copy = lesson.clone_without_progress();
        copy.set_can_save(false);

        copy.root_mut().add_card(card("q")).unwrap();
        assert!(copy.can_save());
        assert!(!lesson.can_save());
    }

    #[test]
    fn test_equality_by_cards() {
        let (clock, mut a) = setup();
        let b = Lesson::new(clock.clone());
        assert_eq!(a, b);

        a.root_mut().add_card(card("q")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let (_clock, mut lesson) = setup();
        assert_eq!(lesson.to_string(), "Lesson(none)");
        lesson.set_file(Some(PathBuf::from("words.jml")));
        assert_eq!(lesson.to_string(), "Lesson(words.jml)");
    }
}
