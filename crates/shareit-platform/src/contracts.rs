use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shareit_booking::{BookingWindow, Page};
use shareit_core::{Booking, BookingResult, BookingStatus, Item, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: Option<i64>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusQuery {
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBookingsQuery {
    #[serde(default = "default_state")]
    pub state: String,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl Default for ListBookingsQuery {
    fn default() -> Self {
        Self {
            state: default_state(),
            from: None,
            size: None,
        }
    }
}

impl ListBookingsQuery {
    /// Everything unless the client asks for paging.
    pub fn page(&self) -> BookingResult<Page> {
        match (self.from, self.size) {
            (None, None) => Ok(Page::all()),
            (from, size) => Page::new(from.unwrap_or(0), size.unwrap_or(Page::DEFAULT_SIZE)),
        }
    }
}

fn default_state() -> String {
    "ALL".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.value(),
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner.id.value(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item: ItemView,
    pub booker: UserView,
    pub status: BookingStatus,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.value(),
            start: booking.start,
            end: booking.end,
            item: booking.item.into(),
            booker: booking.booker.into(),
            status: booking.status,
        }
    }
}

/// Booking reference embedded in an item's booking window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingShortView {
    pub id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<Booking> for BookingShortView {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.value(),
            booker_id: booking.booker.id.value(),
            start: booking.start,
            end: booking.end,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWindowView {
    pub last_booking: Option<BookingShortView>,
    pub next_booking: Option<BookingShortView>,
}

impl From<BookingWindow> for BookingWindowView {
    fn from(window: BookingWindow) -> Self {
        Self {
            last_booking: window.last.map(Into::into),
            next_booking: window.next.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shareit_core::{BookingError, BookingId, ItemId, UserId};

    use super::*;

    fn booking() -> Booking {
        let owner = User {
            id: UserId::new(1),
            name: "owner".to_string(),
            email: "owner@example.com".to_string(),
        };
        let booker = User {
            id: UserId::new(2),
            name: "booker".to_string(),
            email: "booker@example.com".to_string(),
        };
        Booking {
            id: BookingId::new(7),
            start: "2030-01-01T10:00:00Z".parse().unwrap(),
            end: "2030-01-02T10:00:00Z".parse().unwrap(),
            item: Item {
                id: ItemId::new(3),
                name: "tent".to_string(),
                description: "two person tent".to_string(),
                available: true,
                owner,
            },
            booker,
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn create_request_reads_camel_case_item_id() {
        let request: CreateBookingRequest = serde_json::from_value(json!({
            "itemId": 3,
            "start": "2030-01-01T10:00:00Z",
            "end": "2030-01-02T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(request.item_id, Some(3));

        let request: CreateBookingRequest = serde_json::from_value(json!({
            "start": "2030-01-01T10:00:00Z",
            "end": "2030-01-02T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(request.item_id, None);
    }

    #[test]
    fn booking_view_uses_wire_field_names() {
        let value = serde_json::to_value(BookingView::from(booking())).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["status"], "WAITING");
        assert_eq!(value["booker"]["id"], 2);
        assert_eq!(value["item"]["ownerId"], 1);
    }

    #[test]
    fn window_view_exposes_last_and_next_booking() {
        let window = BookingWindow {
            last: None,
            next: Some(booking()),
        };
        let value = serde_json::to_value(BookingWindowView::from(window)).unwrap();

        assert!(value["lastBooking"].is_null());
        assert_eq!(value["nextBooking"]["bookerId"], 2);
    }

    #[test]
    fn list_query_pages_only_when_asked() {
        let query: ListBookingsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.state, "ALL");
        assert_eq!(query.page().unwrap(), Page::all());

        let query = ListBookingsQuery {
            from: Some(20),
            ..ListBookingsQuery::default()
        };
        assert_eq!(query.page().unwrap(), Page::new(20, 10).unwrap());

        let query = ListBookingsQuery {
            from: Some(-1),
            ..ListBookingsQuery::default()
        };
        assert!(matches!(query.page(), Err(BookingError::Validation(_))));
    }
}
