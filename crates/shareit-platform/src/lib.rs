pub mod config;
pub mod contracts;
pub mod db;

pub use config::ServiceConfig;
pub use contracts::{
    BookingShortView, BookingView, BookingWindowView, ChangeStatusQuery, CreateBookingRequest,
    ItemView, ListBookingsQuery, UserView,
};
pub use db::{connect_database, run_migrations};
