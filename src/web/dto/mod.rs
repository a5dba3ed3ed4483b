//! Data Transfer Objects for the web front-end.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
