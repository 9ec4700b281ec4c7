//! 司机页面

mod account;
mod personal;

pub use account::DriverAccountPage;
pub use personal::DriverPersonalPage;
