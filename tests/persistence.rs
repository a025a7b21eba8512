use std::cell::RefCell;
use std::rc::Rc;

use statecraft::save::{AUTOSAVE_SLOT, DirSaveStore, MemorySaveStore, SaveStore};
use statecraft::session::{GameSession, SessionConfig};

fn session_with_store(seed: u64, store: Rc<RefCell<dyn SaveStore>>, autosave: bool) -> GameSession {
    GameSession::new(
        SessionConfig {
            seed: Some(seed),
            autosave,
            ..Default::default()
        },
        store,
    )
}

#[test]
fn scenario_save_load_restores_every_subsystem() {
    let store = Rc::new(RefCell::new(MemorySaveStore::default()));
    let mut session = session_with_store(31, store, false);
    session.advance_turns(80);
    let snapshot = session.state().clone();
    session.save("checkpoint").unwrap();

    session.advance_turns(40);
    session.load("checkpoint").unwrap();

    let restored = session.state();
    assert_eq!(restored.clock, snapshot.clock);
    assert_eq!(restored.economy, snapshot.economy);
    assert_eq!(restored.politics, snapshot.politics);
    assert_eq!(restored.crises, snapshot.crises);
    assert_eq!(restored.diplomacy, snapshot.diplomacy);
    assert_eq!(restored.achievements, snapshot.achievements);
    assert_eq!(restored, &snapshot);
}

#[test]
fn scenario_autosave_slot_tracks_the_latest_fourth_week() {
    let store = Rc::new(RefCell::new(MemorySaveStore::default()));
    let mut session = session_with_store(8, store.clone(), true);
    session.advance_turns(11);

    // Clock reached week 12; the last autosave fired at week 12.
    let autosaved = store.borrow().load(AUTOSAVE_SLOT).unwrap();
    assert_eq!(autosaved.clock.week, 12);
    assert_eq!(store.borrow().list().unwrap().len(), 1);
}

#[test]
fn scenario_disk_saves_survive_a_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Rc::new(RefCell::new(DirSaveStore::new(dir.path()).unwrap()));
        let mut session = session_with_store(12, store, false);
        session.advance_turns(30);
        session.save("campaign").unwrap();
    }

    // Reopen the directory as if after a restart.
    let store = Rc::new(RefCell::new(DirSaveStore::new(dir.path()).unwrap()));
    let mut session = session_with_store(12, store, false);
    session.advance_turns(30);
    let expected = session.state().clone();
    session.load("campaign").unwrap();
    assert_eq!(session.state(), &expected);
}

#[test]
fn scenario_export_moves_a_save_between_stores() {
    let memory = Rc::new(RefCell::new(MemorySaveStore::default()));
    let mut session = session_with_store(3, memory, false);
    session.advance_turns(20);
    session.save("origin").unwrap();
    let payload = session.export_save("origin").unwrap();
    let expected = session.state().clone();

    let dir = tempfile::tempdir().unwrap();
    let disk = Rc::new(RefCell::new(DirSaveStore::new(dir.path()).unwrap()));
    let mut other = session_with_store(99, disk, false);
    other.import_save("imported", &payload).unwrap();
    other.load("imported").unwrap();
    assert_eq!(other.state(), &expected);
}
