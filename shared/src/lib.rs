use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Reservation event as published by the upstream booking system.
///
/// `uuid` is the only required field; everything else may be absent or null
/// and is carried through as-is. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub uuid: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub guests: Option<i32>,
    #[serde(default)]
    pub breakfast_included: Option<bool>,
    #[serde(default)]
    pub payment: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default)]
    pub hotel: Option<HotelPayload>,
    #[serde(default)]
    pub rooms: Option<Vec<RoomPayload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub daily_rate: Option<f64>,
    #[serde(default)]
    pub number_of_days: Option<i32>,
    #[serde(default)]
    pub checkin_date: Option<NaiveDate>,
    #[serde(default)]
    pub checkout_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Converts a wire-format rate into a money value with cent precision.
pub fn rate_from_f64(value: f64) -> BigDecimal {
    BigDecimal::from_f64(value)
        .unwrap_or_default()
        .with_scale_round(2, RoundingMode::HalfUp)
}

/// Line total for one booked room: daily rate times nights, half-up to
/// 2 decimals.
pub fn line_total(daily_rate: &BigDecimal, number_of_days: i32) -> BigDecimal {
    (daily_rate * BigDecimal::from(number_of_days)).with_scale_round(2, RoundingMode::HalfUp)
}

/// Aggregate total for a reservation: sum of its line totals, half-up to
/// 2 decimals. Always recomputed from persisted rows, never trusted from
/// the inbound event.
pub fn aggregate_total(line_totals: &[BigDecimal]) -> BigDecimal {
    line_totals
        .iter()
        .fold(BigDecimal::from(0), |acc, total| acc + total)
        .with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn line_total_multiplies_rate_by_nights() {
        assert_eq!(line_total(&dec("100.00"), 3), dec("300.00"));
        assert_eq!(line_total(&dec("33.33"), 3), dec("99.99"));
    }

    #[test]
    fn line_total_rounds_half_up() {
        assert_eq!(line_total(&dec("0.125"), 1), dec("0.13"));
        assert_eq!(line_total(&dec("10.333"), 3), dec("31.00"));
    }

    #[test]
    fn line_total_with_zero_nights_is_zero() {
        assert_eq!(line_total(&dec("250.00"), 0), dec("0.00"));
    }

    #[test]
    fn aggregate_total_sums_line_totals() {
        let totals = vec![dec("300.00"), dec("300.00")];
        assert_eq!(aggregate_total(&totals), dec("600.00"));
    }

    #[test]
    fn aggregate_total_of_no_rooms_is_zero() {
        assert_eq!(aggregate_total(&[]), dec("0.00"));
    }

    #[test]
    fn rate_from_f64_lands_on_cents() {
        assert_eq!(rate_from_f64(100.1), dec("100.10"));
        assert_eq!(rate_from_f64(0.0), dec("0.00"));
    }

    #[test]
    fn event_decodes_full_payload() {
        let json = r#"{
            "uuid": "res-001",
            "type": "booking",
            "status": "confirmed",
            "guests": 2,
            "breakfast_included": true,
            "payment": {"method": "card"},
            "metadata": {"channel": "web"},
            "created_at": "2024-03-01T12:00:00Z",
            "customer": {"id": "cust-1", "name": "Ana", "email": "ana@example.com", "document": "123"},
            "hotel": {"id": "hotel-1", "name": "Plaza", "city": "Recife", "state": "PE"},
            "rooms": [
                {"id": "room-1", "room_number": "101", "daily_rate": 100.0,
                 "number_of_days": 3, "checkin_date": "2024-03-10",
                 "checkout_date": "2024-03-13", "category": "standard"}
            ]
        }"#;

        let event: ReservationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.uuid, "res-001");
        assert_eq!(event.kind.as_deref(), Some("booking"));
        assert_eq!(event.customer.as_ref().unwrap().id.as_deref(), Some("cust-1"));
        assert_eq!(event.hotel.as_ref().unwrap().city.as_deref(), Some("Recife"));
        let rooms = event.rooms.as_deref().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].daily_rate, Some(100.0));
        assert_eq!(rooms[0].number_of_days, Some(3));
    }

    #[test]
    fn event_tolerates_missing_optional_fields() {
        let event: ReservationEvent = serde_json::from_str(r#"{"uuid": "res-002"}"#).unwrap();
        assert_eq!(event.uuid, "res-002");
        assert!(event.customer.is_none());
        assert!(event.hotel.is_none());
        assert!(event.rooms.is_none());
        assert!(event.created_at.is_none());
    }

    #[test]
    fn event_tolerates_null_rooms_and_bare_room_objects() {
        let event: ReservationEvent =
            serde_json::from_str(r#"{"uuid": "res-003", "rooms": null}"#).unwrap();
        assert!(event.rooms.is_none());

        let event: ReservationEvent =
            serde_json::from_str(r#"{"uuid": "res-004", "rooms": [{}]}"#).unwrap();
        let rooms = event.rooms.as_deref().unwrap();
        assert!(rooms[0].daily_rate.is_none());
        assert!(rooms[0].number_of_days.is_none());
    }

    #[test]
    fn event_without_uuid_is_rejected() {
        assert!(serde_json::from_str::<ReservationEvent>(r#"{"type": "booking"}"#).is_err());
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(serde_json::from_str::<ReservationEvent>("not a json payload").is_err());
    }
}
