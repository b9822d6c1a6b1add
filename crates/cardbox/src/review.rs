//! # Grading Reviews
//!
//! A review session shows a card and asks the learner to recall one face.
//! [`grade`] records the result as one logical step: statistics, level,
//! test date and due date all change together, and the owning category hears
//! about it exactly once through a `Deck` event.
//!
//! ## Transitions
//!
//! | Outcome | Stats | Level | `date_tested` | `date_expired` |
//! |---------|-------|-------|---------------|----------------|
//! | `Passed` | +1 passed, +1 total, +1 learned on the face | +1 | now | policy(new level, now) |
//! | `Failed` | +1 total | 0 | now | none (unlearned) |
//! | `Skipped` | unchanged | unchanged | unchanged | unchanged |
//!
//! How far ahead a passed card is due is not decided here. It is delegated to
//! an [`ExpirationPolicy`]; see [`crate::schedule::ConfiguredSchedule`] for one
//! driven by configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{CardMut, Face};
use crate::clock::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Decides when a card at a given level becomes due again.
pub trait ExpirationPolicy {
    fn expiration_for(&self, level: u32, tested_at: DateTime<Utc>) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graded {
    pub outcome: Outcome,
    pub level_before: u32,
    pub level_after: u32,
    pub expires: Option<DateTime<Utc>>,
}

/// Grades an attached card (a [`CardMut`] from its category) or a detached
/// one (`&mut Card`).
pub fn grade<'a>(
    card: impl Into<CardMut<'a>>,
    face: Face,
    outcome: Outcome,
    policy: &dyn ExpirationPolicy,
    clock: &dyn TimeSource,
) -> Graded {
    let CardMut(card) = card.into();
    let level_before = card.level();
    let now = clock.now();

    match outcome {
        Outcome::Passed => {
            let expires = policy.expiration_for(level_before.saturating_add(1), now);
            card.apply_grade(face, true, now, Some(expires));
        }
        Outcome::Failed => card.apply_grade(face, false, now, None),
        Outcome::Skipped => {}
    }

    tracing::debug!(
        card = %card.id(),
        %face,
        ?outcome,
        from = level_before,
        to = card.level(),
        "graded card"
    );

    Graded {
        outcome,
        level_before,
        level_after: card.level(),
        expires: card.date_expired(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::clock::ManualClock;
    use crate::events::CardEventKind;
    use crate::test_utils::{t0, text, FixedInterval, TestEnv};
    use chrono::Duration;

    fn three_days() -> FixedInterval {
        FixedInterval(Duration::days(3))
    }

    #[test]
    fn test_pass_raises_level_and_schedules() {
        let clock = ManualClock::new(t0() + Duration::hours(1));
        let mut card = Card::with_created(t0(), text("q"), text("a"));

        let graded = grade(&mut card, Face::Front, Outcome::Passed, &three_days(), &clock);

        assert_eq!(graded.level_before, 0);
        assert_eq!(graded.level_after, 1);
        assert_eq!(graded.expires, Some(clock.now() + Duration::days(3)));
        assert_eq!(card.tests_total(), 1);
        assert_eq!(card.tests_passed(), 1);
        assert_eq!(card.learned_amount(Face::Front), 1);
        assert_eq!(card.learned_amount(Face::Back), 0);
        assert_eq!(card.date_tested(), Some(clock.now()));
        assert_eq!(card.date_touched(), clock.now());
        assert!(card.is_learned(&clock));
    }

    #[test]
    fn test_fail_drops_to_unlearned() {
        let clock = ManualClock::new(t0());
        let mut card = Card::with_created(t0(), text("q"), text("a"));
        grade(&mut card, Face::Front, Outcome::Passed, &three_days(), &clock);
        grade(&mut card, Face::Front, Outcome::Passed, &three_days(), &clock);
        assert_eq!(card.level(), 2);

        clock.advance(Duration::days(4));
        let graded = grade(&mut card, Face::Back, Outcome::Failed, &three_days(), &clock);

        assert_eq!(graded.level_before, 2);
        assert_eq!(graded.level_after, 0);
        assert!(graded.expires.is_none());
        assert!(card.is_unlearned());
        assert_eq!(card.tests_total(), 3);
        assert_eq!(card.tests_passed(), 2);
        assert_eq!(card.pass_ratio(), 67);
        assert_eq!(card.date_tested(), Some(clock.now()));
    }

    #[test]
    fn test_skip_changes_nothing() {
        let clock = ManualClock::new(t0() + Duration::hours(2));
        let mut card = Card::with_created(t0(), text("q"), text("a"));

        let graded = grade(&mut card, Face::Front, Outcome::Skipped, &three_days(), &clock);

        assert_eq!(graded.level_after, 0);
        assert_eq!(card.tests_total(), 0);
        assert!(card.date_tested().is_none());
        assert_eq!(card.date_touched(), t0());
    }

    #[test]
    fn test_policy_sees_new_level() {
        struct LevelDays;
        impl ExpirationPolicy for LevelDays {
            fn expiration_for(&self, level: u32, tested_at: DateTime<Utc>) -> DateTime<Utc> {
                tested_at + Duration::days(i64::from(level) * 10)
            }
        }

        let clock = ManualClock::new(t0());
        let mut card = Card::with_created(t0(), text("q"), text("a"));
        grade(&mut card, Face::Front, Outcome::Passed, &LevelDays, &clock);
        assert_eq!(card.date_expired(), Some(t0() + Duration::days(10)));
        grade(&mut card, Face::Front, Outcome::Passed, &LevelDays, &clock);
        assert_eq!(card.date_expired(), Some(t0() + Duration::days(20)));
    }

    #[test]
    fn test_attached_grade_fires_single_deck_event() {
        let mut env = TestEnv::new();
        let id = env
            .root
            .add_card(Card::with_created(t0(), text("q"), text("a")))
            .unwrap();
        env.recorder.clear();

        let card = env.root.card_mut(id).unwrap();
        grade(card, Face::Front, Outcome::Passed, &three_days(), &*env.clock);

        let seen = env.recorder.cards.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, CardEventKind::Deck);
        assert_eq!(seen[0].level, 1);
        assert_eq!(seen[0].category, env.root.id());
    }

    #[test]
    fn test_pass_at_top_level_stays_at_top_level() {
        let mut env = TestEnv::new();
        let id = env
            .root
            .add_card(Card::with_created(t0(), text("q"), text("a")))
            .unwrap();
        env.root.set_card_level(id, u32::MAX).unwrap();

        let card = env.root.card_mut(id).unwrap();
        let graded = grade(card, Face::Front, Outcome::Passed, &three_days(), &*env.clock);

        assert_eq!(graded.level_before, u32::MAX);
        assert_eq!(graded.level_after, u32::MAX);
        assert_eq!(graded.expires, Some(t0() + Duration::days(3)));
        assert_eq!(env.root.deck_count(), u32::MAX);
    }

    #[test]
    fn test_pass_saturates_counters() {
        let clock = ManualClock::new(t0());
        let mut card = Card::with_created(t0(), text("q"), text("a"));
        card.inc_stats(u32::MAX, u32::MAX).unwrap();
        card.set_learned_amount(Face::Back, u32::MAX);

        grade(&mut card, Face::Back, Outcome::Passed, &three_days(), &clock);

        assert_eq!(card.tests_total(), u32::MAX);
        assert_eq!(card.tests_passed(), u32::MAX);
        assert_eq!(card.learned_amount(Face::Back), u32::MAX);
        assert_eq!(card.level(), 1);
    }

    #[test]
    fn test_attached_skip_fires_nothing() {
        let mut env = TestEnv::new();
        let id = env
            .root
            .add_card(Card::with_created(t0(), text("q"), text("a")))
            .unwrap();
        env.recorder.clear();

        let card = env.root.card_mut(id).unwrap();
        grade(card, Face::Front, Outcome::Skipped, &three_days(), &*env.clock);
        assert!(env.recorder.cards.borrow().is_empty());
    }
}
