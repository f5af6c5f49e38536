pub mod document;
pub mod element;
pub mod event;
pub mod types;

pub use document::{Document, NodeId};
pub use element::Element;
pub use event::{Event, Listener, ListenerId};
pub use types::*;
