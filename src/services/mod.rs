pub mod api_client;
pub mod container;
pub mod report_service;
pub mod scheduling_service;

pub use api_client::*;
pub use container::*;
pub use report_service::*;
pub use scheduling_service::*;
