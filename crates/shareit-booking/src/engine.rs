use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shareit_core::{
    Booking, BookingError, BookingId, BookingResult, BookingStore, ItemId, ItemStore, NewBooking,
    Party, UserId, UserStore,
};
use tracing::{info, warn};

use crate::{
    command::StatusCommand,
    config::{EngineConfig, OverlapPolicy},
    filter::{FilterQuery, StateFilter},
    page::Page,
};

/// Last finished and next upcoming booking of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingWindow {
    pub last: Option<Booking>,
    pub next: Option<Booking>,
}

/// Booking lifecycle: creation, owner approval, booker cancellation and the
/// per-user and per-item temporal lookups.
pub struct BookingEngine {
    users: Arc<dyn UserStore>,
    items: Arc<dyn ItemStore>,
    bookings: Arc<dyn BookingStore>,
    config: EngineConfig,
}

impl BookingEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        items: Arc<dyn ItemStore>,
        bookings: Arc<dyn BookingStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            users,
            items,
            bookings,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a WAITING booking of `item` for `requester`.
    ///
    /// Checks run in a fixed order so each failure is reported distinctly:
    /// item id present, requester exists, item exists, item available,
    /// `start` not after `end`, `start != end`, then the overlap policy.
    pub async fn create(
        &self,
        requester: UserId,
        item: Option<ItemId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BookingResult<Booking> {
        info!(user_id = %requester, item_id = ?item.map(ItemId::value), %start, %end, "create booking");

        let item_id = item.ok_or_else(|| BookingError::not_found("no item id"))?;
        let booker = self
            .users
            .get(requester)
            .await?
            .ok_or_else(|| BookingError::not_found("user not found"))?;
        let item = self
            .items
            .get_with_owner(item_id)
            .await?
            .ok_or_else(|| BookingError::not_found("item not found"))?;

        if !item.available {
            return Err(BookingError::validation("item not available"));
        }
        if start > end {
            return Err(BookingError::validation("start date is after end date"));
        }
        if start == end {
            return Err(BookingError::validation("start date equals end date"));
        }

        if self.config.overlap_policy == OverlapPolicy::Strict {
            let clashes = self.bookings.find_overlapping(item.id, start, end).await?;
            if let Some(clash) = clashes.first() {
                warn!(item_id = %item.id, booking_id = %clash.id, "booking window overlaps");
                return Err(BookingError::validation("item already booked for this period"));
            }
        }

        let booking = self
            .bookings
            .insert(NewBooking::waiting(item, booker, start, end))
            .await?;
        Ok(booking)
    }

    /// Owner decision on a WAITING booking.
    pub async fn change_status(
        &self,
        actor: UserId,
        booking_id: BookingId,
        approve: bool,
    ) -> BookingResult<Booking> {
        info!(user_id = %actor, booking_id = %booking_id, approve, "change booking status");
        self.apply(actor, booking_id, StatusCommand::from_approval(approve))
            .await
    }

    /// Booker withdraws their own WAITING booking.
    pub async fn cancel(&self, booker: UserId, booking_id: BookingId) -> BookingResult<Booking> {
        info!(user_id = %booker, booking_id = %booking_id, "cancel booking");
        self.apply(booker, booking_id, StatusCommand::Cancel).await
    }

    async fn apply(
        &self,
        actor: UserId,
        booking_id: BookingId,
        command: StatusCommand,
    ) -> BookingResult<Booking> {
        let booking = self.load(booking_id).await?;
        command.authorize(actor, &booking)?;
        let next = booking.status.transition_to(command.target())?;

        self.bookings
            .update_status(booking.id, booking.status, next)
            .await?
            .ok_or_else(|| BookingError::validation("booking status changed concurrently"))
    }

    pub async fn get_by_id(&self, actor: UserId, booking_id: BookingId) -> BookingResult<Booking> {
        info!(user_id = %actor, booking_id = %booking_id, "get booking");
        let booking = self.load(booking_id).await?;
        if !booking.is_visible_to(actor) {
            return Err(BookingError::validation("not owner"));
        }
        Ok(booking)
    }

    pub async fn list_for_booker(
        &self,
        user: UserId,
        state: &str,
        page: Page,
    ) -> BookingResult<Vec<Booking>> {
        info!(user_id = %user, state, "list bookings by booker");
        self.list(Party::Booker(user), state, page).await
    }

    pub async fn list_for_owner(
        &self,
        user: UserId,
        state: &str,
        page: Page,
    ) -> BookingResult<Vec<Booking>> {
        info!(user_id = %user, state, "list bookings by owner");
        self.list(Party::Owner(user), state, page).await
    }

    async fn list(&self, party: Party, state: &str, page: Page) -> BookingResult<Vec<Booking>> {
        if !self.users.exists(party.user_id()).await? {
            return Err(BookingError::not_found("user not found"));
        }
        let filter: StateFilter = state.parse()?;

        let bookings = match filter.query() {
            FilterQuery::All => self.bookings.list_by_party(party).await?,
            FilterQuery::Window(window) => {
                self.bookings
                    .list_by_party_and_window(party, window, Utc::now())
                    .await?
            }
            FilterQuery::Status(status) => {
                self.bookings
                    .list_by_party_and_status(party, status)
                    .await?
            }
        };

        Ok(page.apply(bookings))
    }

    pub async fn find_last_booking(&self, item: ItemId) -> BookingResult<Option<Booking>> {
        let before = Utc::now()
            .checked_sub_signed(self.config.last_booking_skew)
            .ok_or_else(|| {
                BookingError::Infrastructure(anyhow::anyhow!(
                    "last booking skew {} is out of the supported date range",
                    self.config.last_booking_skew
                ))
            })?;
        Ok(self.bookings.find_last_for_item(item, before).await?)
    }

    pub async fn find_next_booking(&self, item: ItemId) -> BookingResult<Option<Booking>> {
        Ok(self.bookings.find_next_for_item(item, Utc::now()).await?)
    }

    /// Last and next booking of `item`; empty unless `actor` owns the item.
    pub async fn booking_window(&self, actor: UserId, item: ItemId) -> BookingResult<BookingWindow> {
        info!(user_id = %actor, item_id = %item, "item booking window");
        let item = self
            .items
            .get_with_owner(item)
            .await?
            .ok_or_else(|| BookingError::not_found("item not found"))?;

        if !item.is_owned_by(actor) {
            return Ok(BookingWindow::default());
        }

        Ok(BookingWindow {
            last: self.find_last_booking(item.id).await?,
            next: self.find_next_booking(item.id).await?,
        })
    }

    /// Finished booking of `item` by `booker`, if any. Gates item comments.
    pub async fn completed_booking(
        &self,
        booker: UserId,
        item: ItemId,
    ) -> BookingResult<Option<Booking>> {
        Ok(self
            .bookings
            .find_completed_for_item_and_booker(item, booker, Utc::now())
            .await?)
    }

    async fn load(&self, booking_id: BookingId) -> BookingResult<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("booking not found"))
    }
}
