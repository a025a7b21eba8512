//! Core simulation for a turn-based game of governing: a weekly turn loop
//! drives economic, political, crisis, opposition, and diplomatic engines
//! over a single shared state, with an event bus as the only surface
//! consumers see.
//!
//! Typical embedding:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use statecraft::save::MemorySaveStore;
//! use statecraft::session::{GameSession, SessionConfig};
//!
//! let store = Rc::new(RefCell::new(MemorySaveStore::default()));
//! let mut session = GameSession::new(
//!     SessionConfig {
//!         seed: Some(7),
//!         autosave: false,
//!         ..Default::default()
//!     },
//!     store,
//! );
//! session.advance_turns(4);
//! assert_eq!(session.state().clock.week, 5);
//! ```

pub mod bus;
pub mod model;
pub mod save;
pub mod session;
pub mod sim;
pub mod testutil;

pub use bus::{EventBus, GameEvent, ListenerError, Subscription, Topic};
pub use model::GameState;
pub use save::{DirSaveStore, MemorySaveStore, SaveError, SaveStore};
pub use session::{GameSession, SessionConfig};
pub use sim::{Engine, RunState, Scheduler};
