use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::{Cart, ProductSnapshot},
    dto::cart::AddToCartRequest,
    dto::orders::{OrderItemRequest, OrderWithDetail},
    entity::Products,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::order_service,
    state::AppState,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = state.carts.get(user.user_id);
    Ok(ApiResponse::success("OK", cart, None))
}

/// Validates the product against the catalog at call time, then hands the
/// snapshot to the cart store. Stock is checked again inside the checkout
/// transaction, which stays authoritative if inventory moves in between.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let snapshot = ProductSnapshot {
        id: product.id,
        name: product.name,
        price: product.price,
        stock: product.stock,
    };

    let cart = state
        .carts
        .add_item(user.user_id, &snapshot, payload.quantity)?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", cart, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state.carts.remove_item(user.user_id, product_id)?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await;

    Ok(ApiResponse::success("Removed from cart", cart, None))
}

/// Turns the cart into an order. The cart is cleared only after the order
/// workflow commits; on any failure it is left exactly as it was.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderWithDetail>> {
    let cart = state.carts.get(user.user_id);
    if cart.items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".into()));
    }

    let products: Vec<OrderItemRequest> = cart
        .items
        .iter()
        .map(|item| OrderItemRequest {
            id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let order = order_service::create_order(state, user.user_id, &products).await?;

    // An add landing between the commit above and this reset is discarded
    // with the rest of the cart. Accepted: the order reflects the cart as it
    // was read, and the store itself never interleaves mutations.
    state.carts.clear(user.user_id);

    log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.order.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        order,
        Some(Meta::empty()),
    ))
}
