// Application layer: account use cases on top of the repository.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
