//! Service layer for the fragstats assistant
//!
//! This module contains command dispatch and the chat transport loop that
//! feeds it.

pub mod dispatcher;
pub mod transport;

pub use dispatcher::CommandDispatcher;
pub use transport::{serve, ChatTransport, LineTransport, ServeStats};
