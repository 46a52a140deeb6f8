pub mod client;
pub mod credentials;
pub mod error;
pub mod http;

pub use client::AwsClients;
pub use error::AwsError;
