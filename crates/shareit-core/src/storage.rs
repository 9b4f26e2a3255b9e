use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    ids::{BookingId, ItemId, UserId},
    models::{Booking, Item, NewBooking, User},
    status::BookingStatus,
};

/// Which side of a booking a listing is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Booker(UserId),
    Owner(UserId),
}

impl Party {
    pub fn user_id(self) -> UserId {
        match self {
            Party::Booker(id) | Party::Owner(id) => id,
        }
    }

    pub fn matches(self, booking: &Booking) -> bool {
        match self {
            Party::Booker(id) => booking.booker.id == id,
            Party::Owner(id) => booking.owner_id() == id,
        }
    }
}

/// Position of a booking relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// `start <= now <= end`
    Current,
    /// `end <= now`
    Past,
    /// `start >= now`
    Future,
}

impl TimeWindow {
    pub fn contains(self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            TimeWindow::Current => booking.start <= now && now <= booking.end,
            TimeWindow::Past => booking.end <= now,
            TimeWindow::Future => booking.start >= now,
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> anyhow::Result<Option<User>>;

    async fn exists(&self, id: UserId) -> anyhow::Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Item with its owner resolved.
    async fn get_with_owner(&self, id: ItemId) -> anyhow::Result<Option<Item>>;
}

/// Persistence for bookings. Every returned booking has its item, the item's
/// owner and the booker resolved. Listings are ordered by `start` descending.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> anyhow::Result<Booking>;

    /// Moves the booking from `from` to `to`. Returns `None` when the booking
    /// is missing or no longer in `from`.
    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> anyhow::Result<Option<Booking>>;

    async fn get(&self, id: BookingId) -> anyhow::Result<Option<Booking>>;

    async fn list_by_party(&self, party: Party) -> anyhow::Result<Vec<Booking>>;

    async fn list_by_party_and_window(
        &self,
        party: Party,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>>;

    async fn list_by_party_and_status(
        &self,
        party: Party,
        status: BookingStatus,
    ) -> anyhow::Result<Vec<Booking>>;

    /// Latest-starting booking of the item with `end < before`.
    async fn find_last_for_item(
        &self,
        item: ItemId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>>;

    /// Earliest-starting booking of the item with `start > after`.
    async fn find_next_for_item(
        &self,
        item: ItemId,
        after: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>>;

    /// Latest-starting booking of the item by `booker` with `end < before`.
    async fn find_completed_for_item_and_booker(
        &self,
        item: ItemId,
        booker: UserId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>>;

    /// WAITING or APPROVED bookings of the item overlapping `[start, end)`.
    async fn find_overlapping(
        &self,
        item: ItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>>;
}
