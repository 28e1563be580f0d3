use chrono::{DateTime, Duration, TimeZone, Utc};
use convmem_core::{select_recent, timestamp_id, Event, EventDraft, RecencyWindow};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
}

fn event(conv: &str, ts: DateTime<Utc>, text: &str) -> Event {
    EventDraft::user_message(conv, None, text).stamp(timestamp_id(&ts), ts)
}

fn texts(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.text.as_str()).collect()
}

#[test]
fn age_filter_runs_before_count_cap() {
    let t = now();
    let events = vec![
        event("a", t - Duration::days(3), "t-3d"),
        event("a", t - Duration::days(1), "t-1d"),
        event("a", t - Duration::hours(12), "t-12h"),
        event("a", t - Duration::hours(1), "t-1h"),
    ];

    let got = select_recent(events, "a", RecencyWindow::new(2, 2), t);
    assert_eq!(texts(&got), vec!["t-12h", "t-1h"]);
}

#[test]
fn unordered_input_comes_back_ascending() {
    let t = now();
    let events = vec![
        event("a", t - Duration::minutes(1), "third"),
        event("a", t - Duration::minutes(30), "first"),
        event("a", t - Duration::minutes(10), "second"),
    ];

    let got = select_recent(events, "a", RecencyWindow::default(), t);
    assert_eq!(texts(&got), vec!["first", "second", "third"]);
}

#[test]
fn other_conversations_are_excluded() {
    let t = now();
    let events = vec![
        event("a", t - Duration::minutes(2), "mine"),
        event("b", t - Duration::minutes(1), "theirs"),
    ];

    let got = select_recent(events, "a", RecencyWindow::default(), t);
    assert_eq!(texts(&got), vec!["mine"]);
}

#[test]
fn count_cap_keeps_most_recent() {
    let t = now();
    let events: Vec<Event> = (0..15)
        .map(|i| event("a", t - Duration::minutes(15 - i), &format!("m{i}")))
        .collect();

    let got = select_recent(events, "a", RecencyWindow::new(10, 2), t);
    assert_eq!(got.len(), 10);
    assert_eq!(got.first().unwrap().text, "m5");
    assert_eq!(got.last().unwrap().text, "m14");
}

#[test]
fn empty_input_is_empty_output() {
    assert!(select_recent(Vec::new(), "a", RecencyWindow::default(), now()).is_empty());
}

#[test]
fn selection_is_deterministic() {
    let t = now();
    let events: Vec<Event> = (0..6)
        .map(|i| event(if i % 2 == 0 { "a" } else { "b" }, t - Duration::hours(i), "x"))
        .collect();

    let first = select_recent(events.clone(), "a", RecencyWindow::new(2, 1), t);
    let second = select_recent(events, "a", RecencyWindow::new(2, 1), t);
    assert_eq!(first, second);
}

#[test]
fn huge_age_cap_keeps_everything_in_scope() {
    let t = now();
    let events = vec![
        event("a", t - Duration::days(3650), "a decade ago"),
        event("a", t - Duration::hours(1), "recent"),
    ];

    let got = select_recent(events, "a", RecencyWindow::new(10, u32::MAX), t);
    assert_eq!(texts(&got), vec!["a decade ago", "recent"]);
}
