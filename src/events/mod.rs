//! # Events Module
//!
//! Event-driven progress reporting for batch runs.
//!
//! ## Design
//! The runner emits events through a channel, allowing any front end
//! (CLI, log shipper, tests) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Materialize(MaterializeEvent::FolderCreated { path }) = event {
//!             println!("Created {}", path.display());
//!         }
//!     }
//! });
//!
//! runner.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
