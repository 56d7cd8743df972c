//! Session application services.
//!
//! This module contains the in-memory session store and the background
//! sweeper that bounds its memory.

mod store;
mod sweeper;

pub use store::SessionStore;
pub use sweeper::SessionSweeper;
