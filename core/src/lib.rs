//! Market radar core: turns per-district sales and store-closure datasets
//! into normalized multi-axis profiles, period histories, sales
//! distributions and day × time activity grids.

pub mod command;
pub mod config;
pub mod deep_dive;
pub mod engine;
pub mod error;
pub mod filter;
pub mod grid;
pub mod history;
pub mod metrics;
pub mod period;
pub mod record;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod types;
