pub mod cart_handlers;
