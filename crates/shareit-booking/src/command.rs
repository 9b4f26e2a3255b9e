use shareit_core::{Booking, BookingError, BookingResult, BookingStatus, UserId};

/// A requested status change and who is allowed to issue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    Approve,
    Reject,
    Cancel,
}

impl StatusCommand {
    pub fn from_approval(approved: bool) -> Self {
        if approved {
            StatusCommand::Approve
        } else {
            StatusCommand::Reject
        }
    }

    pub fn target(self) -> BookingStatus {
        match self {
            StatusCommand::Approve => BookingStatus::Approved,
            StatusCommand::Reject => BookingStatus::Rejected,
            StatusCommand::Cancel => BookingStatus::Canceled,
        }
    }

    /// Owners approve or reject; only the booker cancels.
    pub fn authorize(self, actor: UserId, booking: &Booking) -> BookingResult<()> {
        match self {
            StatusCommand::Approve | StatusCommand::Reject => {
                if booking.owner_id() != actor {
                    return Err(BookingError::validation("not owner"));
                }
            }
            StatusCommand::Cancel => {
                if !booking.is_booked_by(actor) {
                    return Err(BookingError::validation("not booker"));
                }
            }
        }
        Ok(())
    }
}
