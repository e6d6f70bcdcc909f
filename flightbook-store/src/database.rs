use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, info};

use flightbook_core::{
    Customer, Flight, FlightId, FlightStore, NewReservation, Reservation, ReservationId,
    StoreError, StoreResult, StoreTransaction,
};

use crate::app_config::{DatabaseConfig, IsolationLevel};

/// PostgreSQL gateway. Every transaction from `begin` runs at `isolation`.
#[derive(Clone)]
pub struct PgFlightStore {
    pub pool: PgPool,
    isolation: IsolationLevel,
}

impl PgFlightStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self::from_pool(pool, config.isolation_level))
    }

    pub fn from_pool(pool: PgPool, isolation: IsolationLevel) -> Self {
        Self { pool, isolation }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps driver errors onto the gateway taxonomy by SQLSTATE.
pub(crate) fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // serialization_failure, deadlock_detected
            Some("40001") | Some("40P01") => StoreError::Conflict(db.message().to_string()),
            Some("23505") => StoreError::Duplicate(db.message().to_string()),
            _ => StoreError::Database(err.to_string()),
        },
        _ => StoreError::Database(err.to_string()),
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    fid: i32,
    day_of_month: i32,
    carrier_id: String,
    flight_num: String,
    origin_city: String,
    dest_city: String,
    actual_time: i32,
    capacity: i32,
    price: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            fid: row.fid,
            day_of_month: row.day_of_month,
            carrier_id: row.carrier_id,
            flight_num: row.flight_num,
            origin_city: row.origin_city,
            dest_city: row.dest_city,
            duration_minutes: row.actual_time,
            capacity: row.capacity,
            price: row.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ConnectingRow {
    f1_fid: i32,
    f1_day_of_month: i32,
    f1_carrier_id: String,
    f1_flight_num: String,
    f1_origin_city: String,
    f1_dest_city: String,
    f1_actual_time: i32,
    f1_capacity: i32,
    f1_price: i32,
    f2_fid: i32,
    f2_day_of_month: i32,
    f2_carrier_id: String,
    f2_flight_num: String,
    f2_origin_city: String,
    f2_dest_city: String,
    f2_actual_time: i32,
    f2_capacity: i32,
    f2_price: i32,
}

impl ConnectingRow {
    fn into_legs(self) -> (Flight, Flight) {
        let first = Flight {
            fid: self.f1_fid,
            day_of_month: self.f1_day_of_month,
            carrier_id: self.f1_carrier_id,
            flight_num: self.f1_flight_num,
            origin_city: self.f1_origin_city,
            dest_city: self.f1_dest_city,
            duration_minutes: self.f1_actual_time,
            capacity: self.f1_capacity,
            price: self.f1_price,
        };
        let second = Flight {
            fid: self.f2_fid,
            day_of_month: self.f2_day_of_month,
            carrier_id: self.f2_carrier_id,
            flight_num: self.f2_flight_num,
            origin_city: self.f2_origin_city,
            dest_city: self.f2_dest_city,
            duration_minutes: self.f2_actual_time,
            capacity: self.f2_capacity,
            price: self.f2_price,
        };
        (first, second)
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    rid: i64,
    username: String,
    trip_day: i32,
    fid1: i32,
    fid2: Option<i32>,
    cost: i32,
    paid: bool,
    cancelled: bool,
    created_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            rid: row.rid,
            username: row.username,
            trip_day: row.trip_day,
            fid1: row.fid1,
            fid2: row.fid2,
            cost: row.cost,
            paid: row.paid,
            cancelled: row.cancelled,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    username: String,
    password_hash: String,
    balance: i32,
}

const FLIGHT_COLUMNS: &str =
    "fid, day_of_month, carrier_id, flight_num, origin_city, dest_city, actual_time, capacity, price";

const RESERVATION_COLUMNS: &str =
    "rid, username, trip_day, fid1, fid2, cost, paid, cancelled, created_at";

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn create_customer(
        &self,
        username: &str,
        password_hash: &str,
        balance: i32,
    ) -> StoreResult<()> {
        sqlx::query("INSERT INTO customers (username, password_hash, balance) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(password_hash)
            .bind(balance)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_customer(&self, username: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT username, password_hash, balance FROM customers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(|r| Customer {
            username: r.username,
            password_hash: r.password_hash,
            balance: r.balance,
        }))
    }

    async fn direct_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            r#"
            SELECT {FLIGHT_COLUMNS}
            FROM flights
            WHERE origin_city = $1 AND dest_city = $2 AND day_of_month = $3 AND cancelled = 0
            ORDER BY actual_time ASC, fid ASC
            LIMIT $4
            "#
        );

        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(origin)
            .bind(destination)
            .bind(day_of_month)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        debug!("{} direct flights {} -> {} on day {}", rows.len(), origin, destination, day_of_month);
        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn connecting_flights(
        &self,
        origin: &str,
        destination: &str,
        day_of_month: i32,
        limit: usize,
    ) -> StoreResult<Vec<(Flight, Flight)>> {
        let rows = sqlx::query_as::<_, ConnectingRow>(
            r#"
            SELECT
                f1.fid AS f1_fid, f1.day_of_month AS f1_day_of_month, f1.carrier_id AS f1_carrier_id,
                f1.flight_num AS f1_flight_num, f1.origin_city AS f1_origin_city, f1.dest_city AS f1_dest_city,
                f1.actual_time AS f1_actual_time, f1.capacity AS f1_capacity, f1.price AS f1_price,
                f2.fid AS f2_fid, f2.day_of_month AS f2_day_of_month, f2.carrier_id AS f2_carrier_id,
                f2.flight_num AS f2_flight_num, f2.origin_city AS f2_origin_city, f2.dest_city AS f2_dest_city,
                f2.actual_time AS f2_actual_time, f2.capacity AS f2_capacity, f2.price AS f2_price
            FROM flights f1
            JOIN flights f2 ON f1.dest_city = f2.origin_city AND f1.day_of_month = f2.day_of_month
            WHERE f1.origin_city = $1 AND f2.dest_city = $2 AND f1.day_of_month = $3
                AND f1.cancelled = 0 AND f2.cancelled = 0
            ORDER BY f1.actual_time + f2.actual_time ASC, f1.fid ASC, f2.fid ASC
            LIMIT $4
            "#,
        )
        .bind(origin)
        .bind(destination)
        .bind(day_of_month)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        debug!("{} connecting pairs {} -> {} on day {}", rows.len(), origin, destination, day_of_month);
        Ok(rows.into_iter().map(ConnectingRow::into_legs).collect())
    }

    async fn flight(&self, fid: FlightId) -> StoreResult<Option<Flight>> {
        let sql = format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE fid = $1");
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(fid)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Flight::from))
    }

    async fn reservations_for(&self, username: &str) -> StoreResult<Vec<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE username = $1 ORDER BY rid ASC");
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Must be the first statement of the transaction
        sqlx::query(self.isolation.set_transaction_sql())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        Ok(Box::new(PgTransaction { tx }))
    }

    async fn clear_tables(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        for statement in [
            "DELETE FROM reservations",
            "DELETE FROM customers",
            "UPDATE flights SET num_booked = 0 WHERE num_booked > 0",
            "UPDATE reservation_ids SET next_rid = 1",
        ] {
            sqlx::query(statement).execute(&mut *tx).await.map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        info!("Cleared customers and reservations");
        Ok(())
    }
}

pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn reservations_on_day(&mut self, username: &str, day_of_month: i32) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE username = $1 AND trip_day = $2",
        )
        .bind(username)
        .bind(day_of_month)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx)
    }

    async fn seats_left(&mut self, fid: FlightId) -> StoreResult<i32> {
        sqlx::query_scalar::<_, i32>("SELECT capacity - num_booked FROM flights WHERE fid = $1")
            .bind(fid)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("flight {}", fid)))
    }

    async fn increment_booked(&mut self, fid: FlightId) -> StoreResult<()> {
        sqlx::query("UPDATE flights SET num_booked = num_booked + 1 WHERE fid = $1")
            .bind(fid)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn allocate_rid(&mut self) -> StoreResult<ReservationId> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE reservation_ids SET next_rid = next_rid + 1 RETURNING next_rid - 1",
        )
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx)
    }

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservations (rid, username, trip_day, fid1, fid2, cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.rid)
        .bind(&reservation.username)
        .bind(reservation.trip_day)
        .bind(reservation.fid1)
        .bind(reservation.fid2)
        .bind(reservation.cost)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn reservation(
        &mut self,
        rid: ReservationId,
        username: &str,
    ) -> StoreResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE rid = $1 AND username = $2");
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(rid)
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Reservation::from))
    }

    async fn balance(&mut self, username: &str) -> StoreResult<i32> {
        sqlx::query_scalar::<_, i32>("SELECT balance FROM customers WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("customer {}", username)))
    }

    async fn adjust_balance(&mut self, username: &str, delta: i32) -> StoreResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE customers SET balance = balance + $1 WHERE username = $2 RETURNING balance",
        )
        .bind(delta)
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| StoreError::NotFound(format!("customer {}", username)))
    }

    async fn mark_paid(&mut self, rid: ReservationId, username: &str) -> StoreResult<()> {
        sqlx::query("UPDATE reservations SET paid = TRUE WHERE rid = $1 AND username = $2")
            .bind(rid)
            .bind(username)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn mark_cancelled(&mut self, rid: ReservationId, username: &str) -> StoreResult<()> {
        sqlx::query("UPDATE reservations SET cancelled = TRUE WHERE rid = $1 AND username = $2")
            .bind(rid)
            .bind(username)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(map_sqlx)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await.map_err(map_sqlx)
    }
}
