pub mod docker;
pub mod stats;
pub mod collector;
pub mod history;
pub mod groups;
pub mod monitor;

pub use docker::{ClientError, ContainerInfo, DockerClient};
pub use history::HistoryStore;
pub use monitor::{DashboardView, Monitor};
