pub mod dashboard;

pub use dashboard::{DashboardState, LogsPane};
