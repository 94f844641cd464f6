//! Domain models for the restaurant POS

mod bank;
mod dashboard;
mod employee;
mod event;
mod inventory;
mod kitchen;
mod menu;
mod order;
mod payment;
mod role;
mod table;

pub use bank::*;
pub use dashboard::*;
pub use employee::*;
pub use event::*;
pub use inventory::*;
pub use kitchen::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use role::*;
pub use table::*;
