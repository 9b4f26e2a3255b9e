use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{BookingId, ItemId, UserId},
    status::BookingStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner: User,
}

impl Item {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner.id == user_id
    }
}

/// A reservation of an item for `[start, end]` by `booker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: Item,
    pub booker: User,
    pub status: BookingStatus,
}

impl Booking {
    pub fn owner_id(&self) -> UserId {
        self.item.owner.id
    }

    pub fn is_booked_by(&self, user_id: UserId) -> bool {
        self.booker.id == user_id
    }

    /// Booker or item owner.
    pub fn is_visible_to(&self, user_id: UserId) -> bool {
        self.is_booked_by(user_id) || self.item.is_owned_by(user_id)
    }

    /// Half-open overlap between this booking's window and `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item: Item,
    pub booker: User,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

impl NewBooking {
    pub fn waiting(item: Item, booker: User, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            item,
            booker,
            start,
            end,
            status: BookingStatus::Waiting,
        }
    }

    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            start: self.start,
            end: self.end,
            item: self.item,
            booker: self.booker,
            status: self.status,
        }
    }
}
