use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// The slice of a catalog product a cart line needs. Resolved by the caller
/// against the products table before any cart mutation.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    /// Product name at the time the item was added.
    pub name: String,
    /// Unit price in minor currency units at the time the item was added.
    pub price: i64,
    pub quantity: i32,
    /// `price * quantity`, recomputed after every mutation.
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    /// Sum of all item subtotals.
    pub total: i64,
}

impl Cart {
    fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total: 0,
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(|item| item.subtotal).sum();
    }
}

/// Process-wide cart state, one cart per user at most. Carts are created
/// lazily on first access, cleared on checkout and lost on restart; nothing
/// here is persisted. Mutations serialize under a single write lock, so two
/// concurrent updates for the same user cannot lose each other's writes.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's cart, creating an empty one if absent.
    pub fn get(&self, user_id: Uuid) -> Cart {
        let mut carts = self.carts.write().unwrap_or_else(|e| e.into_inner());
        carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id))
            .clone()
    }

    /// Adds `quantity` of the product to the user's cart. Merges into an
    /// existing line item when the product is already present, otherwise
    /// appends a new line carrying the snapshot's name and price.
    pub fn add_item(
        &self,
        user_id: Uuid,
        product: &ProductSnapshot,
        quantity: i32,
    ) -> AppResult<Cart> {
        if quantity < 1 {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        if quantity > product.stock {
            return Err(AppError::BadRequest(format!(
                "insufficient stock, {} available",
                product.stock
            )));
        }

        let mut carts = self.carts.write().unwrap_or_else(|e| e.into_inner());
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id));

        match cart.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity += quantity;
                item.subtotal = item.price * item.quantity as i64;
            }
            None => cart.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity,
                subtotal: product.price * quantity as i64,
            }),
        }

        cart.recompute_total();
        Ok(cart.clone())
    }

    /// Removes the product's line item from the user's cart.
    pub fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Cart> {
        let mut carts = self.carts.write().unwrap_or_else(|e| e.into_inner());
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id));

        let index = cart
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(AppError::NotFound)?;

        cart.items.remove(index);
        cart.recompute_total();
        Ok(cart.clone())
    }

    /// Resets the user's cart to empty. Called after a successful checkout.
    pub fn clear(&self, user_id: Uuid) {
        let mut carts = self.carts.write().unwrap_or_else(|e| e.into_inner());
        carts.insert(user_id, Cart::empty(user_id));
    }
}
