//! Domain types: ticks, sessions, positions, and closed trades.

mod position;
mod session;
mod tick;
mod trade;

pub use position::OpenPosition;
pub use session::Session;
pub use tick::Tick;
pub use trade::{Direction, Outcome, TradeRecord};
