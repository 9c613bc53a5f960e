diesel::table! {
    customers (id) {
        id -> Int4,
        external_id -> Varchar,
        name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        document -> Nullable<Varchar>,
    }
}

diesel::table! {
    hotels (id) {
        id -> Int4,
        external_id -> Varchar,
        name -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        state -> Nullable<Varchar>,
    }
}

diesel::table! {
    reservations (id) {
        id -> Int4,
        uuid -> Varchar,
        #[sql_name = "type"]
        kind -> Nullable<Varchar>,
        customer_id -> Nullable<Int4>,
        hotel_id -> Nullable<Int4>,
        status -> Nullable<Varchar>,
        guests -> Nullable<Int4>,
        breakfast_included -> Nullable<Bool>,
        payment -> Nullable<Jsonb>,
        metadata -> Nullable<Jsonb>,
        created_at -> Nullable<Timestamptz>,
        total_value -> Numeric,
    }
}

diesel::table! {
    booked_rooms (id) {
        id -> Int4,
        reservation_id -> Int4,
        external_room_id -> Nullable<Varchar>,
        room_number -> Nullable<Varchar>,
        daily_rate -> Numeric,
        number_of_days -> Int4,
        checkin_date -> Nullable<Date>,
        checkout_date -> Nullable<Date>,
        category -> Nullable<Varchar>,
        total_value -> Numeric,
    }
}

diesel::joinable!(reservations -> customers (customer_id));
diesel::joinable!(reservations -> hotels (hotel_id));
diesel::joinable!(booked_rooms -> reservations (reservation_id));

diesel::allow_tables_to_appear_in_same_query!(
    customers,
    hotels,
    reservations,
    booked_rooms,
);
