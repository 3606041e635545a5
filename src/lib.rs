pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod push;
pub mod routing;
pub mod service;
pub mod store;
pub mod utils;

pub use config::AppConfig;
pub use error::{NotificationDeliveryError, StorageError, WorkflowError};
pub use service::{ComplaintService, ServiceDeps};
