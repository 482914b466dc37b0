//! The bot: context, per-update handling, reply texts and the receive loop.

pub mod context;
pub mod handler;
pub mod replies;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::BotContext;
pub use handler::handle_update;
pub use runner::ReceiveLoop;
