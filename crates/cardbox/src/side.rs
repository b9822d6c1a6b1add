//! # Card Sides
//!
//! A [`CardSide`] is one face of a card: its text plus the ids of attached
//! images. Sides notify [`SideObserver`]s when either changes.
//!
//! ## Change Detection
//!
//! Both setters are equality-gated. Writing the value a side already holds does
//! nothing and notifies nobody:
//!
//! - text compares by value ([`FormattedText`] equality);
//! - images compare as **sets**. `["a", "b"]` and `["b", "a"]` are the same
//!   attachment list, so reordering alone is not an edit. The new order is
//!   still kept for display when membership does change.
//!
//! ## Observers
//!
//! Observers are `Rc` handles held in registration order. Notification is
//! synchronous, in that order, before the setter returns. A clone of a side
//! starts with no observers: it is not wired into anything yet.
//!
//! Sides never touch timestamps. Stamping the modification date is the owning
//! card's job.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::content::FormattedText;
use crate::events::ObserverId;

pub trait SideObserver {
    fn on_text_changed(&self, side: &CardSide, text: &FormattedText);
    fn on_images_changed(&self, side: &CardSide, images: &[String]);
}

#[derive(Default)]
pub struct CardSide {
    text: Option<FormattedText>,
    images: Vec<String>,
    observers: Vec<(ObserverId, Rc<dyn SideObserver>)>,
    next_observer: u64,
}

impl CardSide {
    /// A side with no text yet. Call [`CardSide::set_text`] before use.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: FormattedText) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn text(&self) -> Option<&FormattedText> {
        self.text.as_ref()
    }

    /// Replaces the text. Returns `true` if it changed.
    pub fn set_text(&mut self, text: FormattedText) -> bool {
        if self.text.as_ref() == Some(&text) {
            return false;
        }
        self.text = Some(text);
        tracing::trace!(side = %self, "side text changed");
        self.notify_text_changed();
        true
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Replaces the image ids. Returns `true` if the set of ids changed.
    pub fn set_images(&mut self, ids: Vec<String>) -> bool {
        if same_members(&self.images, &ids) {
            return false;
        }
        self.images = ids;
        tracing::trace!(count = self.images.len(), "side images changed");
        for (_, observer) in &self.observers {
            observer.on_images_changed(self, &self.images);
        }
        true
    }

    pub fn add_observer(&mut self, observer: Rc<dyn SideObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if no observer was registered under `id`.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn has_same_text(&self, text: &FormattedText) -> bool {
        self.text.as_ref() == Some(text)
    }

    fn notify_text_changed(&self) {
        let Some(text) = &self.text else {
            return;
        };
        for (_, observer) in &self.observers {
            observer.on_text_changed(self, text);
        }
    }
}

fn same_members(current: &[String], candidate: &[String]) -> bool {
    let current: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    let candidate: BTreeSet<&str> = candidate.iter().map(String::as_str).collect();
    current == candidate
}

impl Clone for CardSide {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            images: self.images.clone(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }
}

impl fmt::Debug for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSide")
            .field("text", &self.text)
            .field("images", &self.images)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}
