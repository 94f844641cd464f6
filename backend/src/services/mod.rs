//! Business logic services for the restaurant POS

pub mod auth;
pub mod bank;
pub mod cashier;
pub mod dashboard;
pub mod employee;
pub mod inventory;
pub mod kitchen;
pub mod menu;
pub mod order;
pub mod seed;
pub mod table;

pub use auth::AuthService;
pub use bank::BankAccountService;
pub use cashier::CashierService;
pub use dashboard::DashboardService;
pub use employee::EmployeeService;
pub use inventory::InventoryService;
pub use kitchen::KitchenService;
pub use menu::MenuService;
pub use order::OrderService;
pub use table::TableService;
