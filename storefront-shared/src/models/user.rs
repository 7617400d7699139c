/// User model and database operations
///
/// Users carry a role and an optional vendor association. The vendor id is
/// null only for platform-level superusers; every storefront user (owner,
/// staff, or customer) belongs to exactly one vendor.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('owner', 'staff', 'customer');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(150),
///     last_name VARCHAR(150),
///     phone_number VARCHAR(20),
///     role user_role NOT NULL DEFAULT 'customer',
///     vendor_id UUID REFERENCES vendors(id) ON DELETE CASCADE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     last_login_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::user::{User, CreateUser, UserRole};
/// use storefront_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(vendor_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("Jane".to_string()),
///     last_name: None,
///     phone_number: None,
///     role: UserRole::Staff,
///     vendor_id: Some(vendor_id),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenancy::TenantOwned;

/// Roles within a vendor's storefront
///
/// - **owner**: full control over the storefront, including deletes,
///   staff assignment, and user management
/// - **staff**: operational access, managing products and working orders
///   that are unassigned or assigned to them
/// - **customer**: self-service only, placing orders and viewing own data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Store owner (full control)
    Owner,

    /// Staff member (operational access)
    Staff,

    /// Customer (self-service only)
    Customer,
}

impl UserRole {
    /// Converts role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Staff => "staff",
            UserRole::Customer => "customer",
        }
    }

    /// Parses role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(UserRole::Owner),
            "staff" => Some(UserRole::Staff),
            "customer" => Some(UserRole::Customer),
            _ => None,
        }
    }

    /// Whether the role has operational (staff-level) access
    pub fn is_staff_level(&self) -> bool {
        matches!(self, UserRole::Owner | UserRole::Staff)
    }
}

/// User model representing an account within (or above) a vendor
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login username, unique across the platform
    pub username: String,

    /// Email address, unique across the platform
    pub email: String,

    /// Argon2id password hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Optional phone number
    pub phone_number: Option<String>,

    /// Role within the vendor
    pub role: UserRole,

    /// Vendor this user belongs to (None only for platform superusers)
    pub vendor_id: Option<Uuid>,

    /// Whether the account is active
    pub is_active: bool,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name for customer-profile defaults
    ///
    /// Joins first and last name; falls back to the username when both
    /// are blank.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl TenantOwned for User {
    fn owning_tenant(&self) -> Option<Uuid> {
        self.vendor_id
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login username (unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password!)
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Optional phone number
    pub phone_number: Option<String>,

    /// Role within the vendor
    pub role: UserRole,

    /// Vendor the user belongs to (None for platform superusers)
    pub vendor_id: Option<Uuid>,
}

/// Input for updating an existing user
///
/// All fields optional; only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New first name (use Some(None) to clear)
    pub first_name: Option<Option<String>>,

    /// New last name (use Some(None) to clear)
    pub last_name: Option<Option<String>>,

    /// New phone number (use Some(None) to clear)
    pub phone_number: Option<Option<String>>,

    /// New role
    pub role: Option<UserRole>,

    /// Update active status
    pub is_active: Option<bool>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists
    /// (unique constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name,
                               phone_number, role, vendor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, username, email, password_hash, first_name, last_name,
                      phone_number, role, vendor_id, is_active, last_login_at,
                      created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.phone_number)
        .bind(data.role)
        .bind(data.vendor_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   phone_number, role, vendor_id, is_active, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   phone_number, role, vendor_id, is_active, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID within a vendor
    ///
    /// This is the preferred lookup for tenant-scoped endpoints: a user id
    /// from another vendor resolves to None, never to another tenant's row.
    pub async fn find_by_id_and_vendor(
        pool: &PgPool,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   phone_number, role, vendor_id, is_active, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE id = $1 AND vendor_id = $2
            "#,
        )
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users belonging to a vendor, newest first
    pub async fn list_by_vendor(
        pool: &PgPool,
        vendor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   phone_number, role, vendor_id, is_active, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE vendor_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(vendor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are updated; `updated_at` is bumped.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.phone_number.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone_number = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, username, email, password_hash, first_name, \
             last_name, phone_number, role, vendor_id, is_active, last_login_at, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(phone_number) = data.phone_number {
            q = q.bind(phone_number);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            phone_number: None,
            role: UserRole::Customer,
            vendor_id: Some(Uuid::new_v4()),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Owner, UserRole::Staff, UserRole::Customer] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("admin"), None);
    }

    #[test]
    fn test_is_staff_level() {
        assert!(UserRole::Owner.is_staff_level());
        assert!(UserRole::Staff.is_staff_level());
        assert!(!UserRole::Customer.is_staff_level());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = sample_user();
        assert_eq!(user.display_name(), "jane");

        user.first_name = Some("Jane".to_string());
        assert_eq!(user.display_name(), "Jane");

        user.last_name = Some("Doe".to_string());
        assert_eq!(user.display_name(), "Jane Doe");
    }

    #[test]
    fn test_owning_tenant_is_vendor() {
        let mut user = sample_user();
        assert_eq!(user.owning_tenant(), user.vendor_id);

        user.vendor_id = None; // platform superuser
        assert_eq!(user.owning_tenant(), None);
    }
}
