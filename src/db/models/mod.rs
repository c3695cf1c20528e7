//! Database models

pub mod cash_closing;
pub mod order;
pub mod user;

pub use cash_closing::{
    CashClosing, DailySummary, KindBreakdown, OpenTable, PaymentBreakdown,
};
pub use order::{CreateOrder, CreateOrderItem, Order, OrderFilters, OrderItem, OrderWithItems};
pub use user::{User, UserInfo};
