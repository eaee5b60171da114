use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use essaytype::practice::Practice;
use essaytype::runtime::{ChannelEventSource, FixedTicker, Runner, TypingEvent};
use essaytype::session::TypingSession;
use essaytype::store::{BlobSessionStore, MemoryBlobStore, SessionStore};

fn key(c: char) -> TypingEvent {
    TypingEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn backspace() -> TypingEvent {
    TypingEvent::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE))
}

fn memory_store() -> BlobSessionStore<MemoryBlobStore> {
    BlobSessionStore::new(MemoryBlobStore::new())
}

// Headless run of the event loop: Runner over a channel instead of a TTY
#[test]
fn headless_typing_flow_completes() {
    let session = TypingSession::new("t1", "hi there", None, 80);
    let mut practice = Practice::new(session, memory_store(), None);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for ev in "hi thx".chars().map(key) {
        tx.send(ev).unwrap();
    }
    tx.send(backspace()).unwrap();
    for ev in "ere".chars().map(key) {
        tx.send(ev).unwrap();
    }

    for _ in 0..100u32 {
        match runner.step() {
            TypingEvent::Tick => {
                practice.on_tick(Local::now()).unwrap();
            }
            TypingEvent::Resize => {}
            TypingEvent::Key(key) => match key.code {
                KeyCode::Char(c) => {
                    practice.type_char(c, Local::now()).unwrap();
                }
                KeyCode::Backspace => practice.backspace(Local::now()),
                _ => {}
            },
        }
        if practice.session().is_completed() {
            break;
        }
    }

    assert!(practice.session().is_completed(), "session should have finished");
    let saved = practice.saved().expect("result persisted");
    assert_eq!(saved.passage_id, "t1");
    // the corrected typo no longer counts
    assert!(saved.errors.is_empty());
    assert_eq!(saved.accuracy, 100);
    assert_eq!(practice.store().list_all(), vec![saved.clone()]);
}

#[test]
fn headless_timed_session_finishes_by_countdown() {
    let (tx, rx) = mpsc::channel();
    let session = TypingSession::new("t2", "a much longer passage than we will type", Some(1), 80);
    let mut practice = Practice::new(session, memory_store(), Some(tx.clone()))
        .with_tick_interval(Duration::from_millis(10));

    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(50)),
    );

    tx.send(key('a')).unwrap();

    // countdown ticks arrive every 10ms; one second needs about a hundred
    for _ in 0..1_000u32 {
        match runner.step() {
            TypingEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    practice.type_char(c, Local::now()).unwrap();
                }
            }
            TypingEvent::Tick => {
                practice.on_tick(Local::now()).unwrap();
            }
            TypingEvent::Resize => {}
        }
        if practice.session().is_completed() {
            break;
        }
    }

    assert!(practice.session().is_completed(), "timed session should end by timeout");
    assert!(!practice.is_counting_down());
    assert_eq!(practice.session().seconds_remaining(), Some(0));
    assert_eq!(practice.store().list_all().len(), 1);
}

#[test]
fn ticks_before_first_keystroke_do_nothing() {
    let (tx, rx) = mpsc::channel();
    let session = TypingSession::new("t3", "abc", Some(1), 80);
    let mut practice = Practice::new(session, memory_store(), Some(tx));

    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    for _ in 0..20u32 {
        if let TypingEvent::Tick = runner.step() {
            practice.on_tick(Local::now()).unwrap();
        }
    }

    assert!(!practice.session().has_started());
    assert!(!practice.session().is_completed());
    assert!(!practice.is_counting_down());
    assert_eq!(practice.session().seconds_remaining(), Some(1));
}
