//! Stepping a net forward and backward: controller, history and the session tying them together.

pub mod controller;
pub mod history;
pub mod observer;
pub mod session;

pub use controller::Controller;
pub use history::{History, HistoryEntry};
pub use observer::{Change, ChangeCause, LogObserver, Observer, ObserverId, ObserverList};
pub use session::{Session, SharedSession};
