use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::users::{UpdateUserRequest, UserList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_users(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(pool: &DbPool, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    if user.user_id != id {
        ensure_admin(user)?;
    }

    let found = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("User", found, None))
}

pub async fn update_user(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    if user.user_id != id {
        ensure_admin(user)?;
    }

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let name = payload.name.unwrap_or(existing.name);
    let phone = payload.phone.or(existing.phone);
    let address = payload.address.or(existing.address);
    let country = payload.country.or(existing.country);
    let city = payload.city.or(existing.city);

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = $2, phone = $3, address = $4, country = $5, city = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(address)
    .bind(country)
    .bind(city)
    .fetch_one(pool)
    .await?;

    log_audit(
        pool,
        Some(user.user_id),
        "user_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Updated", updated, Some(Meta::empty())))
}

pub async fn delete_user(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    log_audit(
        pool,
        Some(user.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
