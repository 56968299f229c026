use axum_shop_api::cart::{CartStore, ProductSnapshot};
use axum_shop_api::error::AppError;
use uuid::Uuid;

fn snapshot(name: &str, price: i64, stock: i32) -> ProductSnapshot {
    ProductSnapshot {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        stock,
    }
}

#[test]
fn fresh_cart_is_empty() {
    let store = CartStore::new();
    let user = Uuid::new_v4();

    let cart = store.get(user);
    assert_eq!(cart.user_id, user);
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
}

#[test]
fn totals_follow_every_mutation() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let keyboard = snapshot("Mech Keyboard", 8_999, 50);
    let mouse = snapshot("Laser Mouse", 3_499, 50);

    let cart = store.add_item(user, &keyboard, 2).unwrap();
    assert_eq!(cart.items[0].subtotal, 17_998);
    assert_eq!(cart.total, 17_998);

    let cart = store.add_item(user, &mouse, 3).unwrap();
    assert_eq!(cart.items.len(), 2);
    for item in &cart.items {
        assert_eq!(item.subtotal, item.price * item.quantity as i64);
    }
    assert_eq!(cart.total, cart.items.iter().map(|i| i.subtotal).sum::<i64>());
    assert_eq!(cart.total, 17_998 + 10_497);

    let cart = store.remove_item(user, keyboard.id).unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total, 10_497);
}

#[test]
fn sequential_adds_merge_into_one_line() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let product = snapshot("Nova Phone X", 99_999, 10);

    store.add_item(user, &product, 1).unwrap();
    let cart = store.add_item(user, &product, 1).unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].subtotal, 199_998);
    assert_eq!(cart.total, 199_998);
}

#[test]
fn over_stock_add_is_rejected_and_cart_unchanged() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let product = snapshot("Pixel Monitor 27", 45_999, 2);

    store.add_item(user, &product, 1).unwrap();
    let err = store.add_item(user, &product, 3).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let cart = store.get(user);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, 45_999);
}

#[test]
fn zero_quantity_is_rejected() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let product = snapshot("Zen Laptop 14", 129_999, 5);

    let err = store.add_item(user, &product, 0).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(store.get(user).items.is_empty());
}

#[test]
fn removing_absent_item_is_not_found_and_cart_unchanged() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let product = snapshot("Zen Laptop 14", 129_999, 5);

    store.add_item(user, &product, 1).unwrap();
    let err = store.remove_item(user, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let cart = store.get(user);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total, 129_999);
}

#[test]
fn carts_are_isolated_per_user() {
    let store = CartStore::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let product = snapshot("Laser Mouse", 3_499, 100);

    store.add_item(alice, &product, 2).unwrap();

    assert!(store.get(bob).items.is_empty());
    assert_eq!(store.get(alice).items.len(), 1);
}

#[test]
fn clear_resets_to_empty() {
    let store = CartStore::new();
    let user = Uuid::new_v4();
    let product = snapshot("Mech Keyboard", 8_999, 50);

    store.add_item(user, &product, 4).unwrap();
    store.clear(user);

    let cart = store.get(user);
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
}
