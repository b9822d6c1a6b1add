//! # Categories
//!
//! A [`Category`] owns cards and child categories, forming a tree. It is the
//! only thing that attaches a card to a container or detaches it, and it
//! relays every card event to its observers and then up through its
//! ancestors (see [`crate::events`]).
//!
//! ## Decks
//!
//! Decks are not stored. A deck is the set of cards in a category's subtree
//! that share a level, listed in touched order ([`Card::cmp_touched`]). This
//! means a level change is only ever a field write plus a `Deck` event.
//!
//! ## Expiry Sweep
//!
//! Cards become due by the passage of time alone, so nothing inside a card
//! can announce it. [`Category::sweep_expired`] is the explicit check an
//! outside scheduler calls (for example once per day). It fires `Expired` for
//! every card whose due time falls after the previous sweep and at or before
//! now. The first sweep reports everything already due.
//!
//! ## Mutable Access
//!
//! Navigation hands out [`CategoryMut`] and [`CardMut`] handles rather than
//! `&mut` references. They deref to `&Category` / `&Card` and forward the
//! mutating operations, so nothing can `mem::swap` a card or a child category
//! out of the tree behind its owner's back.

use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::rc::{Rc, Weak};
use uuid::Uuid;

use crate::card::{Card, CardMut, CardState};
use crate::clock::TimeSource;
use crate::error::{CardboxError, Result};
use crate::events::{
    CardEventKind, CategoryEventKind, CategoryObserver, ContainerRef, EventHub, ObserverId,
};

#[derive(Debug)]
pub struct Category {
    id: Uuid,
    name: String,
    cards: Vec<Card>,
    children: Vec<Category>,
    hub: Rc<EventHub>,
    last_sweep: Option<DateTime<Utc>>,
}

impl Category {
    /// A root category. Children share its clock.
    pub fn new(name: impl Into<String>, clock: Rc<dyn TimeSource>) -> Self {
        Self::with_hub(name.into(), clock, None)
    }

    fn with_hub(name: String, clock: Rc<dyn TimeSource>, parent: Option<Weak<EventHub>>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name,
            cards: Vec::new(),
            children: Vec::new(),
            hub: EventHub::new(id, clock, parent),
            last_sweep: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clock(&self) -> Rc<dyn TimeSource> {
        self.hub.clock()
    }

    pub fn add_observer(&self, observer: Rc<dyn CategoryObserver>) -> ObserverId {
        self.hub.add_observer(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.hub.remove_observer(id)
    }

    // --- Tree ---

    pub fn add_child(&mut self, name: impl Into<String>) -> CategoryMut<'_> {
        CategoryMut(self.push_child(name.into()))
    }

    fn push_child(&mut self, name: String) -> &mut Category {
        let child = Self::with_hub(name, self.hub.clock(), Some(Rc::downgrade(&self.hub)));
        let child_id = child.id;
        self.children.push(child);
        tracing::debug!(parent = %self.id, child = %child_id, "category added");
        self.hub.fire_category_event(CategoryEventKind::Added, child_id);

        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Detaches a direct child. The returned subtree becomes a root.
    pub fn remove_child(&mut self, id: Uuid) -> Result<Category> {
        let pos = self
            .children
            .iter()
            .position(|child| child.id == id)
            .ok_or(CardboxError::CategoryNotFound(id))?;

        self.hub.fire_category_event(CategoryEventKind::Removed, id);
        let child = self.children.remove(pos);
        child.hub.set_parent(None);
        tracing::debug!(parent = %self.id, child = %id, "category removed");
        Ok(child)
    }

    pub fn children(&self) -> &[Category] {
        &self.children
    }

    pub fn find(&self, id: Uuid) -> Option<&Category> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<CategoryMut<'_>> {
        self.locate_mut(id).map(CategoryMut)
    }

    fn locate_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.locate_mut(id))
    }

    // --- Cards ---

    /// Takes ownership of a detached card and fires `Added`.
    pub fn add_card(&mut self, card: Card) -> Result<Uuid> {
        if card.category().is_some() {
            return Err(CardboxError::AlreadyOwned(card.id()));
        }
        Ok(self.attach(card))
    }

    fn attach(&mut self, mut card: Card) -> Uuid {
        let id = card.id();
        card.set_category(Some(ContainerRef::new(&self.hub)));
        self.cards.push(card);
        tracing::debug!(card = %id, category = %self.id, "card added");

        if let Some(card) = self.cards.last() {
            card.notify(CardEventKind::Added);
        }
        id
    }

    /// Fires `Removed` and hands the detached card back.
    pub fn remove_card(&mut self, id: Uuid) -> Result<Card> {
        let pos = self
            .cards
            .iter()
            .position(|card| card.id() == id)
            .ok_or(CardboxError::CardNotFound(id))?;

        self.cards[pos].notify(CardEventKind::Removed);
        let mut card = self.cards.remove(pos);
        card.set_category(None);
        tracing::debug!(card = %id, category = %self.id, "card removed");
        Ok(card)
    }

    /// Cards held directly by this category.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    pub fn card_mut(&mut self, id: Uuid) -> Option<CardMut<'_>> {
        self.cards
            .iter_mut()
            .find(|card| card.id() == id)
            .map(CardMut)
    }

    /// Looks for a card anywhere in this subtree.
    pub fn find_card(&self, id: Uuid) -> Option<&Card> {
        self.card(id)
            .or_else(|| self.children.iter().find_map(|child| child.find_card(id)))
    }

    pub fn find_card_mut(&mut self, id: Uuid) -> Option<CardMut<'_>> {
        self.locate_card_mut(id).map(CardMut)
    }

    fn locate_card_mut(&mut self, id: Uuid) -> Option<&mut Card> {
        if let Some(pos) = self.cards.iter().position(|card| card.id() == id) {
            return Some(&mut self.cards[pos]);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.locate_card_mut(id))
    }

    /// Every card in this subtree, this category's own cards first.
    pub fn all_cards(&self) -> Vec<&Card> {
        let mut all: Vec<&Card> = self.cards.iter().collect();
        for child in &self.children {
            all.extend(child.all_cards());
        }
        all
    }

    pub fn set_card_level(&mut self, id: Uuid, level: u32) -> Result<()> {
        let card = self
            .locate_card_mut(id)
            .ok_or(CardboxError::CardNotFound(id))?;
        card.set_level(level);
        card.notify(CardEventKind::Deck);
        Ok(())
    }

    /// Puts a card back to the unlearned deck with all progress wiped.
    pub fn reset_card(&mut self, id: Uuid) -> Result<()> {
        let now = self.hub.now();
        let card = self
            .locate_card_mut(id)
            .ok_or(CardboxError::CardNotFound(id))?;
        card.reset_progress(now);
        card.notify(CardEventKind::Deck);
        Ok(())
    }

    // --- Decks ---

    pub fn deck(&self, level: u32) -> Vec<&Card> {
        let mut deck: Vec<&Card> = self
            .all_cards()
            .into_iter()
            .filter(|card| card.level() == level)
            .collect();
        deck.sort_by(|a, b| a.cmp_touched(b));
        deck
    }

    /// Number of decks: highest level in the subtree plus one, or 0 when empty.
    pub fn deck_count(&self) -> u32 {
        self.all_cards()
            .iter()
            .map(|card| card.level().saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    pub fn learned_cards(&self, now: DateTime<Utc>) -> Vec<&Card> {
        self.all_cards()
            .into_iter()
            .filter(|card| card.state(now) == CardState::Learned)
            .collect()
    }

    pub fn expired_cards(&self, now: DateTime<Utc>) -> Vec<&Card> {
        self.all_cards()
            .into_iter()
            .filter(|card| card.state(now) == CardState::Expired)
            .collect()
    }

    pub fn unlearned_cards(&self) -> Vec<&Card> {
        self.all_cards()
            .into_iter()
            .filter(|card| card.is_unlearned())
            .collect()
    }

    /// Fires `Expired` for cards that fell due since the last sweep.
    /// Returns how many events fired across the subtree.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.hub.now();
        let since = self.last_sweep;
        let mut fired = 0;

        for card in &self.cards {
            let Some(due) = card.date_expired() else {
                continue;
            };
            if due <= now && since.map_or(true, |last| due > last) {
                card.notify(CardEventKind::Expired);
                fired += 1;
            }
        }
        self.last_sweep = Some(now);

        for child in &mut self.children {
            fired += child.sweep_expired();
        }
        if fired > 0 {
            tracing::debug!(category = %self.id, fired, "expiry sweep");
        }
        fired
    }

    /// Same tree, names and card content, with every card's progress reset.
    /// The copy is a new root with no observers.
    pub fn clone_without_progress(&self) -> Category {
        let mut copy = Category::new(self.name.clone(), self.hub.clock());
        copy.fill_without_progress(self);
        copy
    }

    fn fill_without_progress(&mut self, source: &Category) {
        for card in &source.cards {
            self.attach(card.clone_without_progress());
        }
        for child in &source.children {
            self.push_child(child.name.clone())
                .fill_without_progress(child);
        }
    }
}

/// Mutable access to a category that keeps it in its tree.
///
/// Navigation methods (`add_child`, `find_mut`, `card_mut`, `find_card_mut`)
/// consume the handle and return one for the same borrow, so chains like
/// `lesson.root_mut().find_mut(id)` work. Use [`CategoryMut::reborrow`] to
/// navigate more than once from a handle you keep.
#[derive(Debug)]
pub struct CategoryMut<'a>(pub(crate) &'a mut Category);

impl Deref for CategoryMut<'_> {
    type Target = Category;

    fn deref(&self) -> &Category {
        self.0
    }
}

impl<'a> CategoryMut<'a> {
    pub fn reborrow(&mut self) -> CategoryMut<'_> {
        CategoryMut(&mut *self.0)
    }

    pub fn add_child(self, name: impl Into<String>) -> CategoryMut<'a> {
        CategoryMut(self.0.push_child(name.into()))
    }

    pub fn find_mut(self, id: Uuid) -> Option<CategoryMut<'a>> {
        self.0.locate_mut(id).map(CategoryMut)
    }

    pub fn card_mut(self, id: Uuid) -> Option<CardMut<'a>> {
        self.0.card_mut(id)
    }

    pub fn find_card_mut(self, id: Uuid) -> Option<CardMut<'a>> {
        self.0.find_card_mut(id)
    }

    pub fn remove_child(&mut self, id: Uuid) -> Result<Category> {
        self.0.remove_child(id)
    }

    pub fn add_card(&mut self, card: Card) -> Result<Uuid> {
        self.0.add_card(card)
    }

    pub fn remove_card(&mut self, id: Uuid) -> Result<Card> {
        self.0.remove_card(id)
    }

    pub fn set_card_level(&mut self, id: Uuid, level: u32) -> Result<()> {
        self.0.set_card_level(id, level)
    }

    pub fn reset_card(&mut self, id: Uuid) -> Result<()> {
        self.0.reset_card(id)
    }

    pub fn sweep_expired(&mut self) -> usize {
        self.0.sweep_expired()
    }
}
