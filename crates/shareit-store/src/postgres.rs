use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shareit_core::{
    Booking, BookingId, BookingStatus, BookingStore, Item, ItemId, ItemStore, NewBooking, Party,
    TimeWindow, User, UserId, UserStore,
};
use sqlx::{PgPool, Row, postgres::PgRow};

const BOOKING_SELECT: &str = r#"
    SELECT
        b.id,
        b.start_date,
        b.end_date,
        b.status,
        i.id AS item_id,
        i.name AS item_name,
        i.description AS item_description,
        i.is_available AS item_available,
        o.id AS owner_id,
        o.name AS owner_name,
        o.email AS owner_email,
        u.id AS booker_id,
        u.name AS booker_name,
        u.email AS booker_email
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users o ON o.id = i.owner_id
    JOIN users u ON u.id = b.booker_id
"#;

const ORDER_BY_START_DESC: &str = "ORDER BY b.start_date DESC, b.id DESC";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: UserId) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .context("failed to load user")?;

        row.map(|row| -> anyhow::Result<User> {
            Ok(User {
                id: UserId::new(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            })
        })
        .transpose()
    }

    async fn exists(&self, id: UserId) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .context("failed to check user existence")?;
        Ok(exists)
    }
}

#[derive(Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn get_with_owner(&self, id: ItemId) -> anyhow::Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT
                i.id AS item_id,
                i.name AS item_name,
                i.description AS item_description,
                i.is_available AS item_available,
                o.id AS owner_id,
                o.name AS owner_name,
                o.email AS owner_email
            FROM items i
            JOIN users o ON o.id = i.owner_id
            WHERE i.id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .context("failed to load item")?;

        row.as_ref().map(item_from_row).transpose()
    }
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str, binds: QueryBinds) -> anyhow::Result<Vec<Booking>> {
        let mut query = sqlx::query(sql).bind(binds.key);
        if let Some(time) = binds.time {
            query = query.bind(time);
        }
        if let Some(status) = binds.status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("failed to list bookings")?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn fetch_first(&self, sql: &str, binds: QueryBinds) -> anyhow::Result<Option<Booking>> {
        Ok(self.fetch_all(sql, binds).await?.into_iter().next())
    }
}

struct QueryBinds {
    key: i64,
    time: Option<DateTime<Utc>>,
    status: Option<BookingStatus>,
}

impl QueryBinds {
    fn key(key: i64) -> Self {
        Self {
            key,
            time: None,
            status: None,
        }
    }

    fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

fn party_clause(party: Party) -> &'static str {
    match party {
        Party::Booker(_) => "b.booker_id = $1",
        Party::Owner(_) => "i.owner_id = $1",
    }
}

fn window_clause(window: TimeWindow) -> &'static str {
    match window {
        TimeWindow::Current => "b.start_date <= $2 AND b.end_date >= $2",
        TimeWindow::Past => "b.end_date <= $2",
        TimeWindow::Future => "b.start_date >= $2",
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, booking: NewBooking) -> anyhow::Result<Booking> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item.id.value())
        .bind(booking.booker.id.value())
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .context("failed to persist booking")?;

        Ok(booking.into_booking(BookingId::new(id)))
    }

    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> anyhow::Result<Option<Booking>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE bookings
            SET status = $3
            WHERE id = $1
              AND status = $2
            RETURNING id
            "#,
        )
        .bind(id.value())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("failed to update booking status")?;

        match updated {
            Some(_) => self.get(id).await,
            None => Ok(None),
        }
    }

    async fn get(&self, id: BookingId) -> anyhow::Result<Option<Booking>> {
        let sql = format!("{BOOKING_SELECT} WHERE b.id = $1");
        self.fetch_first(&sql, QueryBinds::key(id.value())).await
    }

    async fn list_by_party(&self, party: Party) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE {} {ORDER_BY_START_DESC}",
            party_clause(party)
        );
        self.fetch_all(&sql, QueryBinds::key(party.user_id().value()))
            .await
    }

    async fn list_by_party_and_window(
        &self,
        party: Party,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE {} AND {} {ORDER_BY_START_DESC}",
            party_clause(party),
            window_clause(window)
        );
        self.fetch_all(&sql, QueryBinds::key(party.user_id().value()).with_time(now))
            .await
    }

    async fn list_by_party_and_status(
        &self,
        party: Party,
        status: BookingStatus,
    ) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE {} AND b.status = $2 {ORDER_BY_START_DESC}",
            party_clause(party)
        );
        self.fetch_all(
            &sql,
            QueryBinds::key(party.user_id().value()).with_status(status),
        )
        .await
    }

    async fn find_last_for_item(
        &self,
        item: ItemId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE b.item_id = $1 AND b.end_date < $2 {ORDER_BY_START_DESC} LIMIT 1"
        );
        self.fetch_first(&sql, QueryBinds::key(item.value()).with_time(before))
            .await
    }

    async fn find_next_for_item(
        &self,
        item: ItemId,
        after: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE b.item_id = $1 AND b.start_date > $2 ORDER BY b.start_date ASC, b.id ASC LIMIT 1"
        );
        self.fetch_first(&sql, QueryBinds::key(item.value()).with_time(after))
            .await
    }

    async fn find_completed_for_item_and_booker(
        &self,
        item: ItemId,
        booker: UserId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE b.item_id = $1 AND b.booker_id = $2 AND b.end_date < $3 {ORDER_BY_START_DESC} LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(item.value())
            .bind(booker.value())
            .bind(before)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load completed booking")?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_overlapping(
        &self,
        item: ItemId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "{BOOKING_SELECT} WHERE b.item_id = $1 AND b.status IN ('WAITING', 'APPROVED') AND b.start_date < $3 AND b.end_date > $2 {ORDER_BY_START_DESC}"
        );
        let rows = sqlx::query(&sql)
            .bind(item.value())
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .context("failed to look up overlapping bookings")?;

        rows.iter().map(booking_from_row).collect()
    }
}

fn item_from_row(row: &PgRow) -> anyhow::Result<Item> {
    Ok(Item {
        id: ItemId::new(row.try_get("item_id")?),
        name: row.try_get("item_name")?,
        description: row.try_get("item_description")?,
        available: row.try_get("item_available")?,
        owner: User {
            id: UserId::new(row.try_get("owner_id")?),
            name: row.try_get("owner_name")?,
            email: row.try_get("owner_email")?,
        },
    })
}

fn booking_from_row(row: &PgRow) -> anyhow::Result<Booking> {
    let status: String = row.try_get("status")?;

    Ok(Booking {
        id: BookingId::new(row.try_get("id")?),
        start: row.try_get("start_date")?,
        end: row.try_get("end_date")?,
        item: item_from_row(row)?,
        booker: User {
            id: UserId::new(row.try_get("booker_id")?),
            name: row.try_get("booker_name")?,
            email: row.try_get("booker_email")?,
        },
        status: status.parse()?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn party_and_window_clauses_bind_key_then_now() {
        assert_eq!(party_clause(Party::Booker(UserId::new(1))), "b.booker_id = $1");
        assert_eq!(party_clause(Party::Owner(UserId::new(1))), "i.owner_id = $1");

        for window in [TimeWindow::Current, TimeWindow::Past, TimeWindow::Future] {
            let clause = window_clause(window);
            assert!(clause.contains("$2"), "{window:?}");
            assert!(!clause.contains("$1"), "{window:?}");
        }
    }

    async fn seed(pool: &PgPool) -> (Item, User) {
        let owner_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, email) VALUES ('owner', 'owner@example.com') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let booker_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, email) VALUES ('booker', 'booker@example.com') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let item_id: i64 = sqlx::query_scalar(
            "INSERT INTO items (name, description, is_available, owner_id) VALUES ('saw', 'hand saw', TRUE, $1) RETURNING id",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let item = PgItemStore::new(pool.clone())
            .get_with_owner(ItemId::new(item_id))
            .await
            .unwrap()
            .unwrap();
        let booker = PgUserStore::new(pool.clone())
            .get(UserId::new(booker_id))
            .await
            .unwrap()
            .unwrap();
        (item, booker)
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "needs a Postgres instance in DATABASE_URL"]
    async fn time_windows_partition_bookings(pool: PgPool) {
        let (item, booker) = seed(&pool).await;
        let store = PgBookingStore::new(pool);
        let now = Utc::now();

        let mut inserted = Vec::new();
        for (start, end) in [
            (now - Duration::days(3), now - Duration::days(2)),
            (now - Duration::hours(1), now + Duration::hours(1)),
            (now + Duration::days(2), now + Duration::days(3)),
        ] {
            let booking = store
                .insert(NewBooking::waiting(item.clone(), booker.clone(), start, end))
                .await
                .unwrap();
            inserted.push(booking.id);
        }
        let [past, current, future] = [inserted[0], inserted[1], inserted[2]];

        let party = Party::Booker(booker.id);
        let ids = |bookings: Vec<Booking>| bookings.into_iter().map(|b| b.id).collect::<Vec<_>>();

        let all = store.list_by_party(party).await.unwrap();
        assert_eq!(ids(all), vec![future, current, past]);

        for (window, expected) in [
            (TimeWindow::Current, current),
            (TimeWindow::Past, past),
            (TimeWindow::Future, future),
        ] {
            let got = store.list_by_party_and_window(party, window, now).await.unwrap();
            assert_eq!(ids(got), vec![expected], "{window:?}");
        }

        let owned = store
            .list_by_party(Party::Owner(item.owner.id))
            .await
            .unwrap();
        assert_eq!(owned.len(), 3);
        assert_eq!(owned[0].item, item);
        assert_eq!(owned[0].booker, booker);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "needs a Postgres instance in DATABASE_URL"]
    async fn status_update_is_compare_and_set(pool: PgPool) {
        let (item, booker) = seed(&pool).await;
        let store = PgBookingStore::new(pool);
        let now = Utc::now();
        let booking = store
            .insert(NewBooking::waiting(item.clone(), booker, now, now + Duration::hours(2)))
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

        let by_status = store
            .list_by_party_and_status(Party::Owner(item.owner.id), BookingStatus::Approved)
            .await
            .unwrap();
        assert_eq!(by_status.len(), 1);

        let overlapping = store
            .find_overlapping(item.id, now + Duration::hours(1), now + Duration::hours(3))
            .await
            .unwrap();
        assert_eq!(overlapping.len(), 1);
        assert!(store.find_next_for_item(item.id, now).await.unwrap().is_none());
    }
}
