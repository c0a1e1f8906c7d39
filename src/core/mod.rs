pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{Clock, FixedClock, SystemClock, WarPhase, WarWindow};
pub use config::WarConfig;
pub use error::{Outcome, Rejection, Result, WarError};
