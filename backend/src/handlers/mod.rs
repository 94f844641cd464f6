//! HTTP request handlers

pub mod auth;
pub mod bank;
pub mod cashier;
pub mod dashboard;
pub mod employee;
pub mod health;
pub mod inventory;
pub mod kitchen;
pub mod live;
pub mod menu;
pub mod order;
pub mod table;

pub use auth::*;
pub use bank::*;
pub use cashier::*;
pub use dashboard::*;
pub use employee::*;
pub use health::*;
pub use inventory::*;
pub use kitchen::*;
pub use live::*;
pub use menu::*;
pub use order::*;
pub use table::*;
