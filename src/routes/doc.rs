use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{Cart, CartItem},
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::AddToCartRequest,
        categories::{CategoryList, CreateCategoryRequest},
        orders::{CreateOrderRequest, OrderItemRequest, OrderList, OrderWithDetail},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{UpdateUserRequest, UserList},
    },
    models::{Category, Order, OrderDetail, Product, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, orders, params, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        categories::list_categories,
        categories::create_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::checkout,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        orders::delete_order
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            Order,
            OrderDetail,
            Cart,
            CartItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            UserList,
            CreateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            CreateOrderRequest,
            OrderItemRequest,
            OrderList,
            OrderWithDetail,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Cart>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
