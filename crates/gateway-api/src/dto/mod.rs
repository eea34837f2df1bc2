//! Wire types for the HTTP adapters.

pub mod request;
pub mod response;
pub mod rpc;
