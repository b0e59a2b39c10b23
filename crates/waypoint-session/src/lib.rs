//! Editing sessions for waypoint workflows
//!
//! Wraps the `waypoint-graph` model with the stateful concerns of an
//! editor session: storage backends ([`persist`]), debounced autosave
//! ([`autosave`]), and snapshot-based undo/redo ([`history`]).

pub mod autosave;
pub mod error;
pub mod history;
pub mod persist;

pub use autosave::Autosave;
pub use error::{Result, SessionError};
pub use history::EditHistory;
pub use persist::{FilePersistence, MemoryPersistence, PersistenceService};
