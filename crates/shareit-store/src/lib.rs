pub mod memory;
pub mod postgres;

pub use memory::{InMemoryBookingStore, InMemoryItemStore, InMemoryUserStore};
pub use postgres::{PgBookingStore, PgItemStore, PgUserStore};
