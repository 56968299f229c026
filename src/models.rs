use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units (cents).
    pub price: i64,
    pub stock: i32,
    pub img_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub date: DateTime<Utc>,
}

/// Priced snapshot belonging to exactly one order. `product_name` and
/// `product_price` are copied from the catalog at order time so the
/// order stays accurate if products are later renamed or repriced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    /// Order total in minor currency units.
    pub price: i64,
    pub product_name: String,
    pub product_price: i64,
}

pub const ORDER_STATUS_ACTIVE: &str = "active";
pub const ORDER_STATUS_CANCELLED: &str = "cancelled";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
