//! 客服页面

mod account;

pub use account::StaffAccountPage;
