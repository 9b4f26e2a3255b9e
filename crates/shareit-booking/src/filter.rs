use std::str::FromStr;

use shareit_core::{BookingError, BookingStatus, TimeWindow};

/// The `state` partition a booking listing is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

/// Store query a filter resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterQuery {
    All,
    Window(TimeWindow),
    Status(BookingStatus),
}

impl StateFilter {
    pub fn query(self) -> FilterQuery {
        match self {
            StateFilter::All => FilterQuery::All,
            StateFilter::Current => FilterQuery::Window(TimeWindow::Current),
            StateFilter::Past => FilterQuery::Window(TimeWindow::Past),
            StateFilter::Future => FilterQuery::Window(TimeWindow::Future),
            StateFilter::Waiting => FilterQuery::Status(BookingStatus::Waiting),
            StateFilter::Rejected => FilterQuery::Status(BookingStatus::Rejected),
        }
    }
}

impl FromStr for StateFilter {
    type Err = BookingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ALL" => Ok(StateFilter::All),
            "CURRENT" => Ok(StateFilter::Current),
            "PAST" => Ok(StateFilter::Past),
            "FUTURE" => Ok(StateFilter::Future),
            "WAITING" => Ok(StateFilter::Waiting),
            "REJECTED" => Ok(StateFilter::Rejected),
            other => Err(BookingError::validation(format!(
                "state not supported: {other}"
            ))),
        }
    }
}
