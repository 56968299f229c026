use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderDetail};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub products: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithDetail {
    pub order: Order,
    pub detail: OrderDetail,
    /// Catalog products referenced by the detail, informational only.
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
