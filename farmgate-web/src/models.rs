//! Persistent records and the stores that read and write them

pub mod admin;
pub mod buyer;
pub mod cart;
pub mod farmer;
pub mod notification;
pub mod product;

pub use admin::{Admin, AdminStore};
pub use buyer::{Buyer, BuyerStore, BuyerUpdate, NewBuyer};
pub use cart::{Cart, CartError, CartLine, CartStore};
pub use farmer::{Farmer, FarmerStatus, FarmerStore, FarmerUpdate, NewFarmer};
pub use notification::{Notification, NotificationKind, NotificationStore};
pub use product::{NewProduct, Product, ProductPage, ProductStore, ProductUpdate};

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
