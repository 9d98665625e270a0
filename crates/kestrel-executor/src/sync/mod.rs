//! Moving data between producer threads, the control thread and the command
//! transport.

mod commander;
mod queue;
mod updater;

pub use commander::{CommandTransport, Commander, LatestDispatcher};
pub use queue::BoundedQueue;
pub use updater::{Decoded, Source, Updater};
