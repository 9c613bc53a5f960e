use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::*;

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::customers)]
pub struct Customer {
    pub id: i32,
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer {
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::hotels)]
pub struct Hotel {
    pub id: i32,
    pub external_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::hotels)]
pub struct NewHotel {
    pub external_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reservations)]
pub struct Reservation {
    pub id: i32,
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub customer_id: Option<i32>,
    pub hotel_id: Option<i32>,
    pub status: Option<String>,
    pub guests: Option<i32>,
    pub breakfast_included: Option<bool>,
    pub payment: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub total_value: BigDecimal,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::reservations)]
pub struct NewReservation {
    pub uuid: String,
    pub kind: Option<String>,
    pub customer_id: Option<i32>,
    pub hotel_id: Option<i32>,
    pub status: Option<String>,
    pub guests: Option<i32>,
    pub breakfast_included: Option<bool>,
    pub payment: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::booked_rooms)]
pub struct BookedRoom {
    pub id: i32,
    pub reservation_id: i32,
    pub external_room_id: Option<String>,
    pub room_number: Option<String>,
    pub daily_rate: BigDecimal,
    pub number_of_days: i32,
    pub checkin_date: Option<NaiveDate>,
    pub checkout_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub total_value: BigDecimal,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::booked_rooms)]
pub struct NewBookedRoom {
    pub reservation_id: i32,
    pub external_room_id: Option<String>,
    pub room_number: Option<String>,
    pub daily_rate: BigDecimal,
    pub number_of_days: i32,
    pub checkin_date: Option<NaiveDate>,
    pub checkout_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub total_value: BigDecimal,
}

impl NewReservation {
    pub fn from_event(event: &ReservationEvent, customer_id: Option<i32>, hotel_id: Option<i32>) -> Self {
        Self {
            uuid: event.uuid.clone(),
            kind: event.kind.clone(),
            customer_id,
            hotel_id,
            status: event.status.clone(),
            guests: event.guests,
            breakfast_included: event.breakfast_included,
            payment: event.payment.clone(),
            metadata: event.metadata.clone(),
            created_at: event.created_at,
        }
    }
}

impl NewBookedRoom {
    /// Missing numeric fields count as zero rather than failing the event.
    pub fn from_event(reservation_id: i32, room: &RoomPayload) -> Self {
        let daily_rate = rate_from_f64(room.daily_rate.unwrap_or(0.0));
        let number_of_days = room.number_of_days.unwrap_or(0);
        let total_value = line_total(&daily_rate, number_of_days);

        Self {
            reservation_id,
            external_room_id: room.id.clone(),
            room_number: room.room_number.clone(),
            daily_rate,
            number_of_days,
            checkin_date: room.checkin_date,
            checkout_date: room.checkout_date,
            category: room.category.clone(),
            total_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_room_line_total_is_rate_times_nights() {
        let room = RoomPayload {
            id: Some("room-1".to_string()),
            room_number: Some("101".to_string()),
            daily_rate: Some(100.0),
            number_of_days: Some(3),
            checkin_date: None,
            checkout_date: None,
            category: Some("standard".to_string()),
        };

        let new_room = NewBookedRoom::from_event(7, &room);
        assert_eq!(new_room.reservation_id, 7);
        assert_eq!(new_room.external_room_id.as_deref(), Some("room-1"));
        assert_eq!(new_room.total_value, "300.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn booked_room_missing_numerics_default_to_zero() {
        let room = RoomPayload {
            id: None,
            room_number: None,
            daily_rate: None,
            number_of_days: None,
            checkin_date: None,
            checkout_date: None,
            category: None,
        };

        let new_room = NewBookedRoom::from_event(1, &room);
        assert_eq!(new_room.daily_rate, "0.00".parse::<BigDecimal>().unwrap());
        assert_eq!(new_room.number_of_days, 0);
        assert_eq!(new_room.total_value, "0.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn reservation_row_carries_event_fields_and_resolved_refs() {
        let event: ReservationEvent = serde_json::from_str(
            r#"{"uuid": "res-9", "type": "booking", "status": "confirmed", "guests": 2}"#,
        )
        .unwrap();

        let new_reservation = NewReservation::from_event(&event, Some(3), None);
        assert_eq!(new_reservation.uuid, "res-9");
        assert_eq!(new_reservation.kind.as_deref(), Some("booking"));
        assert_eq!(new_reservation.customer_id, Some(3));
        assert_eq!(new_reservation.hotel_id, None);
        assert_eq!(new_reservation.guests, Some(2));
    }
}
