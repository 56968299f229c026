use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::categories::{CategoryList, CreateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let name_taken = Categories::find()
        .filter(Column::Name.eq(payload.name.clone()))
        .one(&state.orm)
        .await?
        .is_some();
    if name_taken {
        return Err(AppError::BadRequest(
            "category name is already taken".into(),
        ));
    }

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
    }
    .insert(&state.orm)
    .await?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}
