//! Domain types for TickLab.

pub mod bar;
pub mod event;
pub mod label;
pub mod market;
pub mod tick;

pub use bar::Bar;
pub use event::{CandidateEvent, Direction, EventId};
pub use label::{Label, Outcome};
pub use market::{DataError, MarketData};
pub use tick::Tick;

/// Symbol type alias
pub type Symbol = String;

pub(crate) const NANOS_PER_SEC: i64 = 1_000_000_000;
