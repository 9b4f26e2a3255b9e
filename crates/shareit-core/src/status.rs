use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{BookingError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Waiting,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_transitions(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Waiting => &[
                BookingStatus::Approved,
                BookingStatus::Rejected,
                BookingStatus::Canceled,
            ],
            BookingStatus::Approved | BookingStatus::Rejected | BookingStatus::Canceled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Bookings in these statuses hold the item for their time window.
    pub fn holds_item(self) -> bool {
        matches!(self, BookingStatus::Waiting | BookingStatus::Approved)
    }

    pub fn transition_to(self, next: BookingStatus) -> Result<BookingStatus, BookingError> {
        if self.allowed_transitions().contains(&next) {
            return Ok(next);
        }

        if self.is_terminal() {
            return Err(BookingError::validation(format!(
                "booking already {}",
                self.as_str().to_ascii_lowercase()
            )));
        }

        Err(BookingError::validation(format!(
            "booking cannot move from {} to {}",
            self, next
        )))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_moves_to_every_terminal_status() {
        for next in [
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ] {
            assert_eq!(BookingStatus::Waiting.transition_to(next).unwrap(), next);
            assert!(next.is_terminal());
        }
    }

    #[test]
    fn terminal_statuses_reject_further_transitions() {
        let err = BookingStatus::Approved
            .transition_to(BookingStatus::Rejected)
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref msg) if msg == "booking already approved"));

        let err = BookingStatus::Canceled
            .transition_to(BookingStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn waiting_cannot_transition_to_itself() {
        let err = BookingStatus::Waiting
            .transition_to(BookingStatus::Waiting)
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref msg) if msg.contains("WAITING to WAITING")));
    }

    #[test]
    fn parses_upper_case_names_only() {
        assert_eq!("REJECTED".parse::<BookingStatus>(), Ok(BookingStatus::Rejected));
        assert_eq!(
            "rejected".parse::<BookingStatus>(),
            Err(UnknownStatus("rejected".to_string()))
        );
    }
}
