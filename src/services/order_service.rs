use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderItemRequest, OrderList, OrderWithDetail},
    entity::{
        order_detail_products::{
            ActiveModel as DetailProductActive, Column as DetailProductCol,
            Entity as OrderDetailProducts,
        },
        order_details::{
            ActiveModel as DetailActive, Column as DetailCol, Entity as OrderDetails,
            Model as DetailModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ORDER_STATUS_ACTIVE, ORDER_STATUS_CANCELLED, Order, OrderDetail},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Creates an order from `(product, quantity)` pairs inside one transaction:
/// every product is locked and validated before any write, then stock is
/// decremented, the order header inserted and the detail snapshotted. Any
/// failure rolls the whole sequence back, so no stock is lost on a rejected
/// order.
pub async fn create_order(
    state: &AppState,
    user_id: Uuid,
    products: &[OrderItemRequest],
) -> AppResult<OrderWithDetail> {
    if products.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one product".into(),
        ));
    }

    let requested = merge_duplicates(products)?;

    let txn = state.orm.begin().await?;

    if Users::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    // Lock and validate every product before touching anything.
    let mut lines: Vec<(ProductModel, i32)> = Vec::with_capacity(requested.len());
    for (product_id, quantity) in &requested {
        let product = Products::find_by_id(*product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if product.stock < *quantity {
            return Err(AppError::BadRequest(format!(
                "insufficient stock for {}, {} available",
                product.name, product.stock
            )));
        }
        lines.push((product, *quantity));
    }

    let total: i64 = lines
        .iter()
        .map(|(p, qty)| p.price * *qty as i64)
        .sum();

    for (product, quantity) in &lines {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(*quantity))
            .filter(ProdCol::Id.eq(product.id))
            .exec(&txn)
            .await?;
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        status: Set(ORDER_STATUS_ACTIVE.into()),
        date: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    // One detail per order; the schema holds a single snapshot pair, so a
    // multi-product order renders joined names and summed unit prices.
    let product_name = lines
        .iter()
        .map(|(p, _)| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let product_price: i64 = lines.iter().map(|(p, _)| p.price).sum();

    let detail = DetailActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        price: Set(total),
        product_name: Set(product_name),
        product_price: Set(product_price),
    }
    .insert(&txn)
    .await?;

    let mut product_ids = Vec::with_capacity(lines.len());
    for (product, _) in &lines {
        DetailProductActive {
            order_detail_id: Set(detail.id),
            product_id: Set(product.id),
        }
        .insert(&txn)
        .await?;
        product_ids.push(product.id);
    }

    txn.commit().await?;

    Ok(OrderWithDetail {
        order: order_from_entity(order),
        detail: detail_from_entity(detail),
        product_ids,
    })
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if !user.is_admin() {
        condition = condition.add(OrderCol::UserId.eq(user.user_id));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::Date);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithDetail>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let product_ids = OrderDetailProducts::find()
        .filter(DetailProductCol::OrderDetailId.eq(detail.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| row.product_id)
        .collect();

    let data = OrderWithDetail {
        order: order_from_entity(order),
        detail: detail_from_entity(detail),
        product_ids,
    };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// `active -> cancelled`; there is no transition out of `cancelled`.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    if order.status == ORDER_STATUS_CANCELLED {
        return Err(AppError::BadRequest("order is already cancelled".into()));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(ORDER_STATUS_CANCELLED.into());
    let order = active.update(&state.orm).await?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    // The detail and its product references go with the order via FK cascade.
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Collapses repeated product ids into one line so stock validation sees the
/// combined quantity. Lines come back sorted by product id; every order
/// transaction acquires its row locks in that one global order, so two
/// concurrent orders over the same products cannot deadlock each other.
pub fn merge_duplicates(products: &[OrderItemRequest]) -> AppResult<Vec<(Uuid, i32)>> {
    let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(products.len());
    for item in products {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".into(),
            ));
        }
        match merged.iter_mut().find(|(id, _)| *id == item.id) {
            Some((_, qty)) => {
                *qty = qty.checked_add(item.quantity).ok_or_else(|| {
                    AppError::BadRequest("quantity is too large".into())
                })?;
            }
            None => merged.push((item.id, item.quantity)),
        }
    }
    merged.sort_by_key(|(id, _)| *id);
    Ok(merged)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        status: model.status,
        date: model.date.with_timezone(&Utc),
    }
}

fn detail_from_entity(model: DetailModel) -> OrderDetail {
    OrderDetail {
        id: model.id,
        order_id: model.order_id,
        price: model.price,
        product_name: model.product_name,
        product_price: model.product_price,
    }
}
