//! Board engine: a pure reducer plus the driver that runs its effects
//! against a task store.

pub mod driver;
pub mod state;

pub use driver::Engine;
pub use state::{
    reduce, BoardState, BoardView, ColumnSnapshot, Effect, Event, FocusView, MessageKind, Notice,
    UserMessage,
};
