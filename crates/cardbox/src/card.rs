//! # Cards
//!
//! A [`Card`] is the unit of review: a front and a back [`CardSide`], a
//! proficiency level, timing state and pass/fail counters.
//!
//! ## Derived State
//!
//! Whether a card is due is never stored; it falls out of `date_expired`
//! compared to "now":
//!
//! | `date_expired` | State |
//! |----------------|-------|
//! | `None` | [`CardState::Unlearned`] (never reviewed, or failed) |
//! | `> now` | [`CardState::Learned`] |
//! | `<= now` | [`CardState::Expired`] |
//!
//! Exactly one holds at any instant.
//!
//! ## Timestamps
//!
//! - `date_created`: set at construction.
//! - `date_modified`: stamped on content edits while attached to a category.
//!   Never earlier than `date_created`; setters that would break this fail.
//! - `date_tested`: last real grading. Skips don't count.
//! - `date_expired`: next due time.
//! - `date_touched`: last test, reset or creation. This is the one ordering key
//!   shared by every card regardless of category. See [`Card::cmp_touched`].
//!
//! ## Events
//!
//! An attached card reports to its category (see [`crate::events`]):
//! content edits fire `Edited`; per-side counter changes and graded reviews
//! fire `Deck`. A detached card fires nothing, and content edits on a detached
//! card leave `date_modified` alone.
//!
//! ## Copies
//!
//! Two named copy operations with different postconditions:
//!
//! - [`Card::duplicate`]: full copy of content, progress and dates.
//! - [`Card::clone_without_progress`]: content and creation date only.
//!
//! Both get a fresh id and start detached.
//!
//! ## Editing Attached Cards
//!
//! A category never hands out `&mut Card`. It hands out a [`CardMut`], which
//! reads like a `&Card` and forwards the editing operations, but cannot be
//! used to move the card out of its category or swap another one in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use uuid::Uuid;

use crate::clock::TimeSource;
use crate::content::FormattedText;
use crate::error::{CardboxError, Result};
use crate::events::{CardEventKind, ContainerRef, ObserverId};
use crate::side::{CardSide, SideObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Front => f.write_str("front"),
            Face::Back => f.write_str("back"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardState {
    Unlearned,
    Learned,
    Expired,
}

#[derive(Debug)]
pub struct Card {
    id: Uuid,
    front: CardSide,
    back: CardSide,
    level: u32,
    date_created: DateTime<Utc>,
    date_modified: DateTime<Utc>,
    date_tested: Option<DateTime<Utc>>,
    date_expired: Option<DateTime<Utc>>,
    date_touched: DateTime<Utc>,
    tests_total: u32,
    tests_passed: u32,
    front_learned: u32,
    back_learned: u32,
    container: Option<ContainerRef>,
}

impl Card {
    /// A new card created now.
    pub fn new(front: FormattedText, back: FormattedText, clock: &dyn TimeSource) -> Self {
        Self::with_created(clock.now(), front, back)
    }

    pub fn with_created(created: DateTime<Utc>, front: FormattedText, back: FormattedText) -> Self {
        Self::from_sides(created, CardSide::with_text(front), CardSide::with_text(back))
    }

    pub fn from_sides(created: DateTime<Utc>, front: CardSide, back: CardSide) -> Self {
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            level: 0,
            date_created: created,
            date_modified: created,
            date_tested: None,
            date_expired: None,
            date_touched: created,
            tests_total: 0,
            tests_passed: 0,
            front_learned: 0,
            back_learned: 0,
            container: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn side(&self, face: Face) -> &CardSide {
        match face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }

    pub fn front(&self) -> &CardSide {
        &self.front
    }

    pub fn back(&self) -> &CardSide {
        &self.back
    }

    fn side_mut(&mut self, face: Face) -> &mut CardSide {
        match face {
            Face::Front => &mut self.front,
            Face::Back => &mut self.back,
        }
    }

    // --- Content ---

    /// Replaces the text of both sides.
    ///
    /// Blank content on either side is rejected before anything changes.
    /// Passing the current content is a no-op.
    pub fn set_sides(&mut self, front: FormattedText, back: FormattedText) -> Result<()> {
        if front.is_blank() {
            return Err(CardboxError::EmptySide(Face::Front));
        }
        if back.is_blank() {
            return Err(CardboxError::EmptySide(Face::Back));
        }
        if self.front.has_same_text(&front) && self.back.has_same_text(&back) {
            return Ok(());
        }

        self.front.set_text(front);
        self.back.set_text(back);
        self.content_edited();
        Ok(())
    }

    /// Plain-text variant of [`Card::set_sides`].
    pub fn set_sides_text(&mut self, front: &str, back: &str) -> Result<()> {
        self.set_sides(FormattedText::unformatted(front), FormattedText::unformatted(back))
    }

    /// Replaces the image ids on one side. Returns `true` if they changed.
    pub fn set_images(&mut self, face: Face, ids: Vec<String>) -> bool {
        let changed = self.side_mut(face).set_images(ids);
        if changed {
            self.content_edited();
        }
        changed
    }

    pub fn add_side_observer(&mut self, face: Face, observer: Rc<dyn SideObserver>) -> ObserverId {
        self.side_mut(face).add_observer(observer)
    }

    pub fn remove_side_observer(&mut self, face: Face, id: ObserverId) -> bool {
        self.side_mut(face).remove_observer(id)
    }

    fn content_edited(&mut self) {
        let Some(now) = self.container.as_ref().and_then(ContainerRef::now) else {
            return;
        };
        self.date_modified = now.max(self.date_created);
        tracing::debug!(card = %self.id, "card content edited");
        self.notify(CardEventKind::Edited);
    }

    // --- Per-side counters ---

    pub fn learned_amount(&self, face: Face) -> u32 {
        match face {
            Face::Front => self.front_learned,
            Face::Back => self.back_learned,
        }
    }

    pub fn set_learned_amount(&mut self, face: Face, amount: u32) {
        match face {
            Face::Front => self.front_learned = amount,
            Face::Back => self.back_learned = amount,
        }
        self.notify(CardEventKind::Deck);
    }

    /// Saturates at `u32::MAX`.
    pub fn increment_learned_amount(&mut self, face: Face) {
        let amount = self.learned_amount(face).saturating_add(1);
        self.set_learned_amount(face, amount);
    }

    pub fn reset_learned_amount(&mut self) {
        self.set_learned_amount(Face::Front, 0);
        self.set_learned_amount(Face::Back, 0);
    }

    // --- Test statistics ---

    pub fn tests_total(&self) -> u32 {
        self.tests_total
    }

    pub fn tests_passed(&self) -> u32 {
        self.tests_passed
    }

    /// Adds review results. Does not touch level or dates.
    ///
    /// Fails without changing either counter if `passed > total` or if a
    /// counter would overflow.
    pub fn inc_stats(&mut self, passed: u32, total: u32) -> Result<()> {
        if passed > total {
            return Err(CardboxError::InvalidStats { passed, total });
        }
        let (Some(new_total), Some(new_passed)) = (
            self.tests_total.checked_add(total),
            self.tests_passed.checked_add(passed),
        ) else {
            return Err(CardboxError::StatsOverflow { passed, total });
        };
        self.tests_total = new_total;
        self.tests_passed = new_passed;
        Ok(())
    }

    /// Percentage of passed tests, rounded. A card with no tests yields 0.
    pub fn pass_ratio(&self) -> u32 {
        if self.tests_total == 0 {
            return 0;
        }
        (100.0 * f64::from(self.tests_passed) / f64::from(self.tests_total)).round() as u32
    }

    pub fn reset_stats(&mut self) {
        self.tests_total = 0;
        self.tests_passed = 0;
        self.front_learned = 0;
        self.back_learned = 0;
    }

    // --- Dates ---

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Fails if `date` is later than the current modification date.
    pub fn set_date_created(&mut self, date: DateTime<Utc>) -> Result<()> {
        if date > self.date_modified {
            return Err(CardboxError::ModifiedBeforeCreated {
                modified: self.date_modified,
                created: date,
            });
        }
        self.date_created = date;
        Ok(())
    }

    pub fn date_modified(&self) -> DateTime<Utc> {
        self.date_modified
    }

    /// Fails if `date` is earlier than the creation date.
    pub fn set_date_modified(&mut self, date: DateTime<Utc>) -> Result<()> {
        if date < self.date_created {
            return Err(CardboxError::ModifiedBeforeCreated {
                modified: date,
                created: self.date_created,
            });
        }
        self.date_modified = date;
        Ok(())
    }

    pub fn date_tested(&self) -> Option<DateTime<Utc>> {
        self.date_tested
    }

    /// Testing always counts as a touch.
    pub fn set_date_tested(&mut self, date: DateTime<Utc>) {
        self.date_tested = Some(date);
        self.date_touched = date;
    }

    pub fn date_expired(&self) -> Option<DateTime<Utc>> {
        self.date_expired
    }

    /// Sets the due date directly. `None` marks the card as never reviewed.
    ///
    /// Fires no event. Callers moving a card between decks fire `Deck`
    /// themselves (see [`crate::review::grade`]).
    pub fn set_date_expired(&mut self, date: Option<DateTime<Utc>>) {
        self.date_expired = date;
    }

    pub fn date_touched(&self) -> DateTime<Utc> {
        self.date_touched
    }

    pub fn set_date_touched(&mut self, date: DateTime<Utc>) {
        self.date_touched = date;
    }

    // --- State ---

    pub fn state(&self, now: DateTime<Utc>) -> CardState {
        match self.date_expired {
            None => CardState::Unlearned,
            Some(due) if due > now => CardState::Learned,
            Some(_) => CardState::Expired,
        }
    }

    pub fn is_unlearned(&self) -> bool {
        self.date_expired.is_none()
    }

    pub fn is_learned(&self, clock: &dyn TimeSource) -> bool {
        self.state(clock.now()) == CardState::Learned
    }

    pub fn is_expired(&self, clock: &dyn TimeSource) -> bool {
        self.state(clock.now()) == CardState::Expired
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    // --- Ownership ---

    /// Id of the owning category, if any.
    pub fn category(&self) -> Option<Uuid> {
        self.container.as_ref().map(ContainerRef::category)
    }

    pub(crate) fn set_category(&mut self, container: Option<ContainerRef>) {
        self.container = container;
    }

    pub(crate) fn notify(&self, kind: CardEventKind) {
        if let Some(container) = &self.container {
            container.fire(kind, self);
        }
    }

    // --- Review transitions ---

    /// Applies a graded review as one step and fires a single `Deck` event.
    /// Counters and level saturate: the top level stays the top level.
    pub(crate) fn apply_grade(
        &mut self,
        face: Face,
        passed: bool,
        tested_at: DateTime<Utc>,
        expires: Option<DateTime<Utc>>,
    ) {
        self.tests_total = self.tests_total.saturating_add(1);
        if passed {
            self.tests_passed = self.tests_passed.saturating_add(1);
            let learned = match face {
                Face::Front => &mut self.front_learned,
                Face::Back => &mut self.back_learned,
            };
            *learned = learned.saturating_add(1);
            self.level = self.level.saturating_add(1);
        } else {
            self.level = 0;
        }
        self.set_date_tested(tested_at);
        self.date_expired = expires;
        self.notify(CardEventKind::Deck);
    }

    /// Wipes progress: level 0, no due date, zeroed counters.
    pub(crate) fn reset_progress(&mut self, now: DateTime<Utc>) {
        self.level = 0;
        self.date_expired = None;
        self.date_touched = now;
        self.reset_stats();
    }

    // --- Copies ---

    /// Full copy including progress and dates. The copy is detached.
    pub fn duplicate(&self) -> Card {
        Card {
            id: Uuid::new_v4(),
            front: self.front.clone(),
            back: self.back.clone(),
            level: self.level,
            date_created: self.date_created,
            date_modified: self.date_modified,
            date_tested: self.date_tested,
            date_expired: self.date_expired,
            date_touched: self.date_touched,
            tests_total: self.tests_total,
            tests_passed: self.tests_passed,
            front_learned: self.front_learned,
            back_learned: self.back_learned,
            container: None,
        }
    }

    /// Same content and creation date, none of the learning progress.
    pub fn clone_without_progress(&self) -> Card {
        Card::from_sides(self.date_created, self.front.clone(), self.back.clone())
    }

    /// Total order for mixing cards from any category: by `date_touched`,
    /// then `date_created`, then id.
    pub fn cmp_touched(&self, other: &Card) -> Ordering {
        self.date_touched
            .cmp(&other.date_touched)
            .then_with(|| self.date_created.cmp(&other.date_created))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Mutable access to a card that keeps it in place.
///
/// A detached card you own converts with `CardMut::from(&mut card)`.
#[derive(Debug)]
pub struct CardMut<'a>(pub(crate) &'a mut Card);

impl<'a> From<&'a mut Card> for CardMut<'a> {
    fn from(card: &'a mut Card) -> Self {
        Self(card)
    }
}

impl Deref for CardMut<'_> {
    type Target = Card;

    fn deref(&self) -> &Card {
        self.0
    }
}

impl CardMut<'_> {
    pub fn set_sides(&mut self, front: FormattedText, back: FormattedText) -> Result<()> {
        self.0.set_sides(front, back)
    }

    pub fn set_sides_text(&mut self, front: &str, back: &str) -> Result<()> {
        self.0.set_sides_text(front, back)
    }

    pub fn set_images(&mut self, face: Face, ids: Vec<String>) -> bool {
        self.0.set_images(face, ids)
    }

    pub fn add_side_observer(&mut self, face: Face, observer: Rc<dyn SideObserver>) -> ObserverId {
        self.0.add_side_observer(face, observer)
    }

    pub fn remove_side_observer(&mut self, face: Face, id: ObserverId) -> bool {
        self.0.remove_side_observer(face, id)
    }

    pub fn set_learned_amount(&mut self, face: Face, amount: u32) {
        self.0.set_learned_amount(face, amount);
    }

    pub fn increment_learned_amount(&mut self, face: Face) {
        self.0.increment_learned_amount(face);
    }

    pub fn reset_learned_amount(&mut self) {
        self.0.reset_learned_amount();
    }

    pub fn inc_stats(&mut self, passed: u32, total: u32) -> Result<()> {
        self.0.inc_stats(passed, total)
    }

    pub fn reset_stats(&mut self) {
        self.0.reset_stats();
    }

    pub fn set_date_created(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.0.set_date_created(date)
    }

    pub fn set_date_modified(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.0.set_date_modified(date)
    }

    pub fn set_date_tested(&mut self, date: DateTime<Utc>) {
        self.0.set_date_tested(date);
    }

    pub fn set_date_expired(&mut self, date: Option<DateTime<Utc>>) {
        self.0.set_date_expired(date);
    }

    pub fn set_date_touched(&mut self, date: DateTime<Utc>) {
        self.0.set_date_touched(date);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}/{})", self.front, self.back)
    }
}
