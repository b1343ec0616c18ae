mod element;
mod error;
mod stack;

pub use element::{Capture, UndoElement};
pub use error::UndoError;
pub use stack::{UndoSet, UndoStack};
