// Engine library root
// Candle history, indicators, live feed reconciliation and the session driver.

pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod services;
