mod api;
mod credentials;
mod error;
mod instance;

pub use api::*;
pub use credentials::*;
pub use error::*;
pub use instance::*;
