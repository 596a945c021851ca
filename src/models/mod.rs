//! Data structures representing database entities and their API views.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartItemWithProduct};
pub use order::{Order, OrderWithItems};
pub use order_item::OrderItem;
pub use product::Product;
pub use user::User;
