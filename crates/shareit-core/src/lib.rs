pub mod error;
pub mod ids;
pub mod models;
pub mod status;
pub mod storage;

pub use error::{BookingError, BookingResult, UnknownStatus};
pub use ids::{BookingId, ItemId, UserId};
pub use models::{Booking, Item, NewBooking, User};
pub use status::BookingStatus;
pub use storage::{BookingStore, ItemStore, Party, TimeWindow, UserStore};
