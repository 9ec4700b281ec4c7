//! 乘客页面

mod account;
mod order_manager;
mod personal;
mod ticket_manager;

pub use account::UserAccountPage;
pub use order_manager::OrderManagerPage;
pub use personal::UserPersonalPage;
pub use ticket_manager::TicketManagerPage;
