//! Domain types for PairLab

pub mod bar;
pub mod instrument;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod trade;

pub use bar::{PriceBar, PriceSeries};
pub use instrument::{InstrumentId, Universe, UniverseError, MAX_INSTRUMENTS};
pub use order::Side;
pub use portfolio::PortfolioSnapshot;
pub use position::{Position, PositionBook};
pub use trade::{RejectReason, Rejection, TradeRecord};
