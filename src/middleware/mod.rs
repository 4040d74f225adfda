pub mod auth;
pub mod response;

pub use auth::{authorize, check, Decision, Privilege};
pub use response::{encode, error_response, with_cors};
