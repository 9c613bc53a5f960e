use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use crate::models::*;
use crate::schema::*;

type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

#[derive(Debug, Deserialize)]
pub struct ReserveFilter {
    pub uuid: Option<String>,
    pub customer_id: Option<String>,
    pub hotel_id: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HotelView {
    pub id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomView {
    pub id: Option<String>,
    pub room_number: Option<String>,
    pub daily_rate: f64,
    pub number_of_days: i32,
    pub checkin_date: Option<NaiveDate>,
    pub checkout_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub total_value: f64,
}

#[derive(Debug, Serialize)]
pub struct ReserveView {
    pub uuid: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub customer: Option<CustomerView>,
    pub hotel: Option<HotelView>,
    pub rooms: Vec<RoomView>,
    pub status: Option<String>,
    pub guests: Option<i32>,
    pub breakfast_included: Option<bool>,
    pub payment: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub computed_total: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ReserveView {
    fn build(
        reservation: Reservation,
        customer: Option<Customer>,
        hotel: Option<Hotel>,
        rooms: Vec<BookedRoom>,
    ) -> Self {
        Self {
            uuid: reservation.uuid,
            created_at: reservation.created_at,
            kind: reservation.kind,
            customer: customer.map(|c| CustomerView {
                id: c.external_id,
                name: c.name,
                email: c.email,
                document: c.document,
            }),
            hotel: hotel.map(|h| HotelView {
                id: h.external_id,
                name: h.name,
                city: h.city,
                state: h.state,
            }),
            rooms: rooms
                .into_iter()
                .map(|room| RoomView {
                    id: room.external_room_id,
                    room_number: room.room_number,
                    daily_rate: room.daily_rate.to_f64().unwrap_or(0.0),
                    number_of_days: room.number_of_days,
                    checkin_date: room.checkin_date,
                    checkout_date: room.checkout_date,
                    category: room.category,
                    total_value: room.total_value.to_f64().unwrap_or(0.0),
                })
                .collect(),
            status: reservation.status,
            guests: reservation.guests,
            breakfast_included: reservation.breakfast_included,
            payment: reservation.payment,
            metadata: reservation.metadata,
            computed_total: reservation.total_value.to_f64().unwrap_or(0.0),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reserves", get(list_reserves))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn list_reserves(
    State(state): State<AppState>,
    Query(filter): Query<ReserveFilter>,
) -> Result<Json<Vec<ReserveView>>, (StatusCode, Json<ErrorResponse>)> {
    match fetch_reserves(&state.pool, filter).await {
        Ok(reserves) => Ok(Json(reserves)),
        Err(e) => {
            tracing::error!("Failed to list reserves: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list reserves".to_string(),
                }),
            ))
        }
    }
}

async fn fetch_reserves(pool: &DbPool, filter: ReserveFilter) -> Result<Vec<ReserveView>> {
    let mut conn = pool.get().await?;

    let mut query = reservations::table
        .left_join(customers::table)
        .left_join(hotels::table)
        .into_boxed();

    if let Some(uuid) = filter.uuid {
        query = query.filter(reservations::uuid.eq(uuid));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(customers::external_id.eq(customer_id));
    }
    if let Some(hotel_id) = filter.hotel_id {
        query = query.filter(hotels::external_id.eq(hotel_id));
    }
    if let Some(room_id) = filter.room_id {
        query = query.filter(exists(
            booked_rooms::table
                .filter(booked_rooms::reservation_id.eq(reservations::id))
                .filter(booked_rooms::external_room_id.eq(room_id)),
        ));
    }

    let rows = query
        .order(reservations::created_at.desc())
        .limit(100)
        .load::<(Reservation, Option<Customer>, Option<Hotel>)>(&mut conn)
        .await?;

    let mut reserves = Vec::with_capacity(rows.len());
    for (reservation, customer, hotel) in rows {
        let rooms = booked_rooms::table
            .filter(booked_rooms::reservation_id.eq(reservation.id))
            .load::<BookedRoom>(&mut conn)
            .await?;

        reserves.push(ReserveView::build(reservation, customer, hotel, rooms));
    }

    Ok(reserves)
}

pub async fn health_check() -> &'static str {
    "OK"
}
