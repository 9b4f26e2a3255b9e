use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shareit_core::{
    Booking, BookingId, BookingStatus, BookingStore, Item, ItemId, ItemStore, NewBooking, Party,
    TimeWindow, User, UserId, UserStore,
};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
    sequence: RwLock<i64>,
}

impl InMemoryUserStore {
    pub async fn insert(&self, name: &str, email: &str) -> User {
        let mut sequence_guard = self.sequence.write().await;
        *sequence_guard += 1;

        let user = User {
            id: UserId::new(*sequence_guard),
            name: name.to_string(),
            email: email.to_string(),
        };

        self.users.write().await.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: UserId) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryItemStore {
    items: RwLock<HashMap<ItemId, Item>>,
    sequence: RwLock<i64>,
}

impl InMemoryItemStore {
    pub async fn insert(&self, name: &str, description: &str, available: bool, owner: User) -> Item {
        let mut sequence_guard = self.sequence.write().await;
        *sequence_guard += 1;

        let item = Item {
            id: ItemId::new(*sequence_guard),
            name: name.to_string(),
            description: description.to_string(),
            available,
            owner,
        };

        self.items.write().await.insert(item.id, item.clone());
        item
    }

    pub async fn set_available(&self, id: ItemId, available: bool) -> anyhow::Result<()> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("item {id} is not stored"))?;
        item.available = available;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get_with_owner(&self, id: ItemId) -> anyhow::Result<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }
}

/// Bookings keep the item and booker snapshot taken at insert time.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<BTreeMap<BookingId, Booking>>,
    sequence: RwLock<i64>,
}

impl InMemoryBookingStore {
    async fn collect<F>(&self, keep: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let bookings = self.bookings.read().await;
        let mut matched: Vec<Booking> = bookings.values().filter(|b| keep(b)).cloned().collect();
        sort_by_start_desc(&mut matched);
        matched
    }
}

fn sort_by_start_desc(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: NewBooking) -> anyhow::Result<Booking> {
        let mut sequence_guard = self.sequence.write().await;
        *sequence_guard += 1;

        let stored = booking.into_booking(BookingId::new(*sequence_guard));
        self.bookings.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> anyhow::Result<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn get(&self, id: BookingId) -> anyhow::Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_by_party(&self, party: Party) -> anyhow::Result<Vec<Booking>> {
        Ok(self.collect(|b| party.matches(b)).await)
    }

    async fn list_by_party_and_window(
        &self,
        party: Party,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>> {
        Ok(self
            .collect(|b| party.matches(b) && window.contains(b, now))
            .await)
    }

    async fn list_by_party_and_status(
        &self,
        party: Party,
        status: BookingStatus,
    ) -> anyhow::Result<Vec<Booking>> {
        Ok(self
            .collect(|b| party.matches(b) && b.status == status)
            .await)
    }

    async fn find_last_for_item(
        &self,
        item: ItemId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let matched = self.collect(|b| b.item.id == item && b.end < before).await;
        Ok(matched.into_iter().next())
    }

    async fn find_next_for_item(
        &self,
        item: ItemId,
        after: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let matched = self.collect(|b| b.item.id == item && b.start > after).await;
        Ok(matched.into_iter().last())
    }

    async fn find_completed_for_item_and_booker(
        &self,
        item: ItemId,
        booker: UserId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let matched = self
            .collect(|b| b.item.id == item && b.booker.id == booker && b.end < before)
            .await;
        Ok(matched.into_iter().next())
    }

    async fn find_overlapping(
        &self,
        item: ItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>> {
        Ok(self
            .collect(|b| b.item.id == item && b.status.holds_item() && b.overlaps(start, end))
            .await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    async fn fixture() -> (InMemoryBookingStore, Item, User) {
        let users = InMemoryUserStore::default();
        let items = InMemoryItemStore::default();
        let owner = users.insert("owner", "owner@example.com").await;
        let booker = users.insert("booker", "booker@example.com").await;
        let item = items.insert("drill", "cordless drill", true, owner).await;
        (InMemoryBookingStore::default(), item, booker)
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let (store, item, booker) = fixture().await;
        let now = Utc::now();

        let first = store
            .insert(NewBooking::waiting(item.clone(), booker.clone(), now, now + Duration::hours(1)))
            .await
            .unwrap();
        let second = store
            .insert(NewBooking::waiting(item, booker, now, now + Duration::hours(2)))
            .await
            .unwrap();

        assert_eq!(first.id, BookingId::new(1));
        assert_eq!(second.id, BookingId::new(2));
        assert_eq!(store.get(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn update_status_only_applies_from_expected_status() {
        let (store, item, booker) = fixture().await;
        let now = Utc::now();
        let booking = store
            .insert(NewBooking::waiting(item, booker, now, now + Duration::hours(1)))
            .await
            .unwrap();

        let approved = store
            .update_status(booking.id, BookingStatus::Waiting, BookingStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);

        let stale = store
            .update_status(booking.id, BookingStatus::Waiting, BookingStatus::Rejected)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(
            store.get(booking.id).await.unwrap().unwrap().status,
            BookingStatus::Approved
        );
    }

    #[tokio::test]
    async fn next_for_item_picks_earliest_future_start() {
        let (store, item, booker) = fixture().await;
        let now = Utc::now();
        for days in [5, 2, 9] {
            store
                .insert(NewBooking::waiting(
                    item.clone(),
                    booker.clone(),
                    now + Duration::days(days),
                    now + Duration::days(days + 1),
                ))
                .await
                .unwrap();
        }

        let next = store.find_next_for_item(item.id, now).await.unwrap().unwrap();
        assert_eq!(next.start, now + Duration::days(2));
    }

    #[tokio::test]
    async fn overlapping_ignores_released_bookings() {
        let (store, item, booker) = fixture().await;
        let now = Utc::now();
        let rejected = store
            .insert(NewBooking::waiting(item.clone(), booker.clone(), now, now + Duration::hours(4)))
            .await
            .unwrap();
        store
            .update_status(rejected.id, BookingStatus::Waiting, BookingStatus::Rejected)
            .await
            .unwrap();

        let hits = store
            .find_overlapping(item.id, now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        assert!(hits.is_empty());

        store
            .insert(NewBooking::waiting(item.clone(), booker, now, now + Duration::hours(4)))
            .await
            .unwrap();
        let hits = store
            .find_overlapping(item.id, now + Duration::hours(4), now + Duration::hours(5))
            .await
            .unwrap();
        assert!(hits.is_empty(), "touching windows do not overlap");
    }
}
