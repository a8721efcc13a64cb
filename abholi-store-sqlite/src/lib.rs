//! Record store implementation on a local SQLite database.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use abholi_core::{
    model::{
        Coordinates, Location, NewPickupRequest, NewUser, PickupRequest, RequestId,
        RequestStatus, Role, User, UserId,
    },
    ports::{PortError, RecordStore},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str =
    "id, name, phone, location_text, latitude, longitude, role, is_online, created_at";
const REQUEST_COLUMNS: &str = "id, creator_id, collector_id, status, created_at, completed_at";

/// Row of the `users` table.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    phone: String,
    location_text: String,
    latitude: f64,
    longitude: f64,
    role: String,
    is_online: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = PortError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            name: row.name,
            phone: row.phone,
            location: Location {
                text: row.location_text,
                coordinates: Coordinates::new(row.latitude, row.longitude)?,
            },
            role: row.role.parse::<Role>()?,
            online: row.is_online,
            created_at: row.created_at,
        })
    }
}

/// Row of the `pickup_requests` table.
#[derive(Debug, FromRow)]
struct RequestRow {
    id: i64,
    creator_id: i64,
    collector_id: Option<i64>,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestRow> for PickupRequest {
    type Error = PortError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(PickupRequest {
            id: RequestId(row.id),
            creator: UserId(row.creator_id),
            collector: row.collector_id.map(UserId),
            status: row.status.parse::<RequestStatus>()?,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// [`RecordStore`] backed by a SQLite file (or an in-memory database).
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open the database at `url` (e.g. `sqlite://abholi.db`), creating the
    /// file if needed, and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the URL is invalid, the database
    /// cannot be opened, or a migration fails.
    pub async fn connect(url: &str) -> Result<Self, PortError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection that is never recycled, so `sqlite::memory:` keeps its data.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        Self::from_pool(pool).await
    }

    /// Open a private in-memory database. Data is lost when the store is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the database cannot be created.
    pub async fn in_memory() -> Result<Self, PortError> {
        Self::connect("sqlite::memory:").await
    }

    /// Wrap an existing pool and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when a migration fails.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, PortError> {
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|err| PortError::Storage(format!("migration failed: {err}")))?;
        debug!("sqlite schema up to date");
        Ok(Self { pool })
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, PortError> {
        let result = sqlx::query(
            "
            INSERT INTO users (name, phone, location_text, latitude, longitude, role, is_online, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            ",
        )
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.location.text)
        .bind(user.location.coordinates.latitude())
        .bind(user.location.coordinates.longitude())
        .bind(user.role.slug())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        let id = UserId(result.last_insert_rowid());
        debug!(user_id = %id, "user row inserted");

        Ok(User {
            id,
            name: user.name,
            phone: user.phone,
            location: user.location,
            role: user.role,
            online: false,
            created_at: user.created_at,
        })
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, PortError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn users(&self) -> Result<Vec<User>, PortError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn online_collectors(&self) -> Result<Vec<User>, PortError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ? AND is_online = 1 ORDER BY id"
        ))
        .bind(Role::Collector.slug())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    async fn set_online(&self, id: UserId, online: bool) -> Result<bool, PortError> {
        let result = sqlx::query("UPDATE users SET is_online = ? WHERE id = ?")
            .bind(online)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_request(&self, request: NewPickupRequest) -> Result<PickupRequest, PortError> {
        let result = sqlx::query(
            "
            INSERT INTO pickup_requests (creator_id, collector_id, status, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(request.creator.0)
        .bind(request.collector.map(|collector| collector.0))
        .bind(RequestStatus::Pending.slug())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        let id = RequestId(result.last_insert_rowid());
        debug!(request_id = %id, "pickup request row inserted");

        Ok(PickupRequest {
            id,
            creator: request.creator,
            collector: request.collector,
            status: RequestStatus::Pending,
            created_at: request.created_at,
            completed_at: None,
        })
    }

    async fn request(&self, id: RequestId) -> Result<Option<PickupRequest>, PortError> {
        sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM pickup_requests WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(PickupRequest::try_from)
        .transpose()
    }

    async fn requests(&self) -> Result<Vec<PickupRequest>, PortError> {
        sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM pickup_requests ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(PickupRequest::try_from)
        .collect()
    }

    async fn pending_requests_for(
        &self,
        collector: UserId,
    ) -> Result<Vec<PickupRequest>, PortError> {
        sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM pickup_requests
             WHERE collector_id = ? AND status = ?
             ORDER BY id"
        ))
        .bind(collector.0)
        .bind(RequestStatus::Pending.slug())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(PickupRequest::try_from)
        .collect()
    }

    async fn mark_completed(&self, id: RequestId, at: DateTime<Utc>) -> Result<bool, PortError> {
        let result = sqlx::query(
            "UPDATE pickup_requests SET status = ?, completed_at = ? WHERE id = ? AND status = ?",
        )
        .bind(RequestStatus::Completed.slug())
        .bind(at)
        .bind(id.0)
        .bind(RequestStatus::Pending.slug())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
    }
}

fn storage_error(err: sqlx::Error) -> PortError {
    PortError::Storage(err.to_string())
}
