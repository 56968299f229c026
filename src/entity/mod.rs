pub mod audit_logs;
pub mod categories;
pub mod order_detail_products;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use order_detail_products::Entity as OrderDetailProducts;
pub use order_details::Entity as OrderDetails;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
