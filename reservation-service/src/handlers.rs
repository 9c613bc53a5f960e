use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures::StreamExt;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::Message;
use tracing::{error, info};
use shared::*;
use crate::models::*;
use crate::schema::*;

type DbPool = Pool<AsyncPgConnection>;

pub struct EventHandler {
    pool: DbPool,
}

impl EventHandler {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn run(&self, consumer: StreamConsumer) {
        let mut message_stream = consumer.stream();

        while let Some(message) = message_stream.next().await {
            match message {
                Ok(m) => match self.handle_message(&m).await {
                    Ok(()) => {
                        if let Err(e) =
                            consumer.commit_message(&m, rdkafka::consumer::CommitMode::Async)
                        {
                            error!("Error committing message: {}", e);
                        }
                    }
                    Err(e) => {
                        error!(
                            "Error processing message at offset {}, leaving for redelivery: {:#}",
                            m.offset(),
                            e
                        );
                    }
                },
                Err(e) => error!("Error receiving message: {}", e),
            }
        }
    }

    async fn handle_message(&self, message: &BorrowedMessage<'_>) -> Result<()> {
        let payload = match message.payload_view::<str>() {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => return Err(anyhow::anyhow!("Payload is not valid UTF-8: {}", e)),
            None => return Err(anyhow::anyhow!("Message has no payload")),
        };

        let event: ReservationEvent =
            serde_json::from_str(payload).context("Failed to decode reservation event")?;

        let reservation_id = self
            .persist_reservation(&event)
            .await
            .with_context(|| format!("Failed to persist reservation {}", event.uuid))?;

        info!("Persisted reservation {} (id {})", event.uuid, reservation_id);
        Ok(())
    }

    // Everything for one event happens in a single transaction: customer
    // and hotel upserts, the reservation row, its room set, the total.
    pub async fn persist_reservation(&self, event: &ReservationEvent) -> Result<i32> {
        let mut conn = self.pool.get().await?;
        let event = event.clone();

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            Box::pin(async move {
                let customer_id = match &event.customer {
                    Some(customer) => upsert_customer(conn, customer).await?,
                    None => None,
                };
                let hotel_id = match &event.hotel {
                    Some(hotel) => upsert_hotel(conn, hotel).await?,
                    None => None,
                };

                let new_reservation = NewReservation::from_event(&event, customer_id, hotel_id);
                let inserted = diesel::insert_into(reservations::table)
                    .values(&new_reservation)
                    .on_conflict(reservations::uuid)
                    .do_nothing()
                    .returning(reservations::id)
                    .get_result::<i32>(conn)
                    .await
                    .optional()?;

                // Duplicate delivery: the unique constraint swallowed the
                // insert, so find the existing row in the same transaction.
                let reservation_id = match inserted {
                    Some(id) => id,
                    None => {
                        reservations::table
                            .filter(reservations::uuid.eq(&event.uuid))
                            .select(reservations::id)
                            .first::<i32>(conn)
                            .await?
                    }
                };

                sync_booked_rooms(conn, reservation_id, event.rooms.as_deref().unwrap_or(&[]))
                    .await?;

                let line_totals = booked_rooms::table
                    .filter(booked_rooms::reservation_id.eq(reservation_id))
                    .select(booked_rooms::total_value)
                    .load::<BigDecimal>(conn)
                    .await?;

                diesel::update(reservations::table.filter(reservations::id.eq(reservation_id)))
                    .set(reservations::total_value.eq(aggregate_total(&line_totals)))
                    .execute(conn)
                    .await?;

                Ok(reservation_id)
            })
        })
        .await
    }
}

// Last write wins: attributes from the latest event always overwrite the
// stored ones.
async fn upsert_customer(
    conn: &mut AsyncPgConnection,
    customer: &CustomerPayload,
) -> Result<Option<i32>> {
    let external_id = match &customer.id {
        Some(id) => id.clone(),
        None => return Ok(None),
    };

    let new_customer = NewCustomer {
        external_id,
        name: customer.name.clone(),
        email: customer.email.clone(),
        document: customer.document.clone(),
    };

    let id = diesel::insert_into(customers::table)
        .values(&new_customer)
        .on_conflict(customers::external_id)
        .do_update()
        .set((
            customers::name.eq(excluded(customers::name)),
            customers::email.eq(excluded(customers::email)),
            customers::document.eq(excluded(customers::document)),
        ))
        .returning(customers::id)
        .get_result::<i32>(conn)
        .await?;

    Ok(Some(id))
}

async fn upsert_hotel(conn: &mut AsyncPgConnection, hotel: &HotelPayload) -> Result<Option<i32>> {
    let external_id = match &hotel.id {
        Some(id) => id.clone(),
        None => return Ok(None),
    };

    let new_hotel = NewHotel {
        external_id,
        name: hotel.name.clone(),
        city: hotel.city.clone(),
        state: hotel.state.clone(),
    };

    let id = diesel::insert_into(hotels::table)
        .values(&new_hotel)
        .on_conflict(hotels::external_id)
        .do_update()
        .set((
            hotels::name.eq(excluded(hotels::name)),
            hotels::city.eq(excluded(hotels::city)),
            hotels::state.eq(excluded(hotels::state)),
        ))
        .returning(hotels::id)
        .get_result::<i32>(conn)
        .await?;

    Ok(Some(id))
}

// Replace the room set wholesale so redeliveries do not accumulate
// duplicate rows.
async fn sync_booked_rooms(
    conn: &mut AsyncPgConnection,
    reservation_id: i32,
    rooms: &[RoomPayload],
) -> Result<()> {
    diesel::delete(booked_rooms::table.filter(booked_rooms::reservation_id.eq(reservation_id)))
        .execute(conn)
        .await?;

    let new_rooms: Vec<NewBookedRoom> = rooms
        .iter()
        .map(|room| NewBookedRoom::from_event(reservation_id, room))
        .collect();

    if !new_rooms.is_empty() {
        diesel::insert_into(booked_rooms::table)
            .values(&new_rooms)
            .execute(conn)
            .await?;
    }

    Ok(())
}
