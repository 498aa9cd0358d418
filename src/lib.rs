pub mod alert;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod fmp;
pub mod input;
pub mod levels;
pub mod model;
pub mod pipeline;
pub mod proximity;
pub mod symbols;
pub mod ui;
