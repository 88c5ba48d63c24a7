//! focusboard - a Kanban task board engine
//!
//! Tasks live in status columns, carry per-task timers, and can be the
//! target of a Pomodoro-style focus session. The engine is a pure reducer
//! over `BoardState`; persistence goes through the `TaskStore` trait.
//!
//! # Module Organization
//!
//! - `domain`: tasks, timers, focus sessions, filtering and the board
//! - `engine`: events, effects, the reducer and its driver
//! - `persistence`: snapshot codec, task stores, config and focus history
//! - `report`: statistics and markdown reports
//! - `clock`: injectable time source
//! - `app`, `ui`, `input`, `ticker`, `notifications`: the terminal front end

pub mod app;
pub mod clock;
pub mod domain;
pub mod engine;
pub mod error;
pub mod input;
pub mod notifications;
pub mod persistence;
pub mod report;
pub mod ticker;
pub mod ui;

pub use error::{Error, Result};
