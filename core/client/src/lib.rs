pub mod client;
pub mod config;
pub mod error;
pub mod status;
pub mod store;

pub use client::Client;
pub use config::Config;
pub use error::ClientError;
pub use status::{LogStatus, StatusSink};
pub use store::{Coils, HoldingRegisters};
