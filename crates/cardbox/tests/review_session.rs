mod common;

use cardbox::{
    grade, Card, CardEventKind, CardboxConfig, Face, FormattedText, Lesson, ManualClock, Outcome,
};
use chrono::Duration;
use common::{observed_root, t0, Recorder};
use std::fs;
use std::rc::Rc;

fn vocab(front: &str, back: &str) -> Card {
    Card::with_created(
        t0(),
        FormattedText::unformatted(front),
        FormattedText::unformatted(back),
    )
}

#[test]
fn test_configured_session_moves_cards_through_decks() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("cardbox.toml");
    fs::write(&path, "interval_days = [1, 3, 7]\n").unwrap();
    let schedule = CardboxConfig::load_from(&[path]).unwrap().schedule().unwrap();

    let clock = Rc::new(ManualClock::new(t0()));
    let mut lesson = Lesson::new(clock.clone());
    let dog = lesson.root_mut().add_card(vocab("der Hund", "the dog")).unwrap();
    let cat = lesson.root_mut().add_card(vocab("die Katze", "the cat")).unwrap();
    lesson.set_can_save(false);

    let card = lesson.root_mut().card_mut(dog).unwrap();
    let graded = grade(card, Face::Front, Outcome::Passed, &schedule, &*clock);
    assert_eq!(graded.expires, Some(t0() + Duration::days(1)));

    let card = lesson.root_mut().card_mut(cat).unwrap();
    grade(card, Face::Front, Outcome::Failed, &schedule, &*clock);

    assert!(lesson.can_save());
    assert_eq!(lesson.root().deck(1).len(), 1);
    assert_eq!(lesson.root().deck(0)[0].id(), cat);
    assert_eq!(lesson.root().deck_count(), 2);

    clock.advance(Duration::days(1));
    assert_eq!(lesson.root().expired_cards(t0() + Duration::days(1))[0].id(), dog);

    let card = lesson.root_mut().card_mut(dog).unwrap();
    let graded = grade(card, Face::Back, Outcome::Passed, &schedule, &*clock);
    assert_eq!(graded.level_after, 2);
    assert_eq!(graded.expires, Some(t0() + Duration::days(4)));

    let history = lesson.history();
    assert_eq!(history.len(), 3);
    let dog_levels: Vec<u32> = history.for_card(dog).map(|entry| entry.level).collect();
    assert_eq!(dog_levels, vec![1, 2]);
}

#[test]
fn test_sweep_reports_each_due_card_once() {
    let (clock, mut root, recorder) = observed_root();
    let soon = root.add_card(vocab("a", "1")).unwrap();
    let later = root.add_card(vocab("b", "2")).unwrap();
    root.card_mut(soon)
        .unwrap()
        .set_date_expired(Some(t0() + Duration::hours(1)));
    root.card_mut(later)
        .unwrap()
        .set_date_expired(Some(t0() + Duration::hours(5)));
    recorder.clear();

    clock.advance(Duration::hours(2));
    assert_eq!(root.sweep_expired(), 1);
    assert_eq!(recorder.count(CardEventKind::Expired), 1);

    clock.advance(Duration::hours(1));
    assert_eq!(root.sweep_expired(), 0);

    clock.advance(Duration::hours(3));
    assert_eq!(root.sweep_expired(), 1);
    assert_eq!(recorder.count(CardEventKind::Expired), 2);
    assert_eq!(recorder.total(), 2);
}

#[test]
fn test_child_events_bubble_to_every_ancestor() {
    let (_clock, mut root, root_recorder) = observed_root();
    let verbs = root.add_child("Verbs");
    let verbs_id = verbs.id();
    let verbs_recorder = Rc::new(Recorder::default());
    verbs.add_observer(verbs_recorder.clone());
    let irregular = verbs.add_child("Irregular").id();
    root_recorder.clear();
    verbs_recorder.clear();

    let id = root
        .find_mut(irregular)
        .unwrap()
        .add_card(vocab("gehen", "to go"))
        .unwrap();
    root.find_card_mut(id)
        .unwrap()
        .increment_learned_amount(Face::Front);

    for recorder in [&root_recorder, &verbs_recorder] {
        assert_eq!(recorder.count(CardEventKind::Added), 1);
        assert_eq!(recorder.count(CardEventKind::Deck), 1);
    }

    let removed = root.find_mut(verbs_id).unwrap().remove_child(irregular).unwrap();
    assert_eq!(removed.all_cards().len(), 1);
    assert_eq!(root_recorder.categories.borrow().len(), 1);
}

#[test]
fn test_removed_card_stops_reporting() {
    let (_clock, mut root, recorder) = observed_root();
    let id = root.add_card(vocab("a", "1")).unwrap();

    let mut card = root.remove_card(id).unwrap();
    assert_eq!(recorder.count(CardEventKind::Removed), 1);
    assert!(card.category().is_none());
    recorder.clear();

    card.increment_learned_amount(Face::Front);
    card.set_sides_text("b", "2").unwrap();
    assert_eq!(recorder.total(), 0);
}
