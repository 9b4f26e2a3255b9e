pub mod command;
pub mod config;
pub mod engine;
pub mod filter;
pub mod page;

pub use command::StatusCommand;
pub use config::{EngineConfig, OverlapPolicy, UnknownOverlapPolicy};
pub use engine::{BookingEngine, BookingWindow};
pub use filter::{FilterQuery, StateFilter};
pub use page::Page;
