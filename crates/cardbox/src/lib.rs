//! # cardbox
//!
//! cardbox is the **review core of a Leitner flashcard box**: cards sorted into
//! levels, each level due again after a longer interval, and a change-event
//! contract so whatever sits on top (a UI, a persistence layer, a statistics
//! view) can follow along without polling.
//!
//! It is a library only. There is no file format and no UI here; those live
//! with the application that embeds it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Lesson (lesson.rs)                                         │
//! │  - Owns the root category, tracks unsaved changes           │
//! │  - Records deck movements in a learn history                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Category tree (category.rs, events.rs)                     │
//! │  - Owns cards, attaches/detaches them, derives decks        │
//! │  - Relays card events to observers and up to the root       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Card state machine (card.rs, side.rs, content.rs)          │
//! │  - Sides, level, dates, counters                            │
//! │  - Unlearned / Learned / Expired derived from "now"         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reviews go through [`review::grade`], which asks an
//! [`review::ExpirationPolicy`] when a passed card is due again. The policy
//! usually comes from [`config::CardboxConfig::schedule`].
//!
//! ## Time
//!
//! Nothing reads the wall clock directly. A [`clock::TimeSource`] is handed to
//! the root category and every time-dependent decision goes through it, which
//! is what lets the tests step across expiry boundaries.
//!
//! ## Threading
//!
//! Everything here is single-threaded (`Rc`, `Cell`, `RefCell`). Observers run
//! synchronously, before the mutating call returns.
//!
//! ## Module Overview
//!
//! - [`card`]: The card state machine
//! - [`side`]: One face of a card, with its own observers
//! - [`content`]: Formatted text and its plain-text view
//! - [`category`]: Category tree, decks and expiry sweeps
//! - [`events`]: Event kinds, observers and the per-category hub
//! - [`lesson`]: Root owner with save-needed flag and learn history
//! - [`review`]: Grading a review and the expiration policy seam
//! - [`schedule`]: Expiration policy driven by configured intervals
//! - [`clock`]: Injectable time source
//! - [`config`]: Configuration management
//! - [`logging`]: Subscriber setup for `tracing` output
//! - [`error`]: Error types

pub mod card;
pub mod category;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod lesson;
pub mod logging;
pub mod review;
pub mod schedule;
pub mod side;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use card::{Card, CardMut, CardState, Face};
pub use category::{Category, CategoryMut};
pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::CardboxConfig;
pub use content::FormattedText;
pub use error::{CardboxError, Result};
pub use events::{CardEvent, CardEventKind, CategoryEventKind, CategoryObserver, ObserverId};
pub use lesson::Lesson;
pub use review::{grade, ExpirationPolicy, Graded, Outcome};
pub use schedule::{ConfiguredSchedule, MAX_INTERVAL_DAYS};
