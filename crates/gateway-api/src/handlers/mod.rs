//! Request handlers organized by endpoint.

pub mod convert;
pub mod convert_json;
pub mod formats;
pub mod health;
pub mod info;
pub mod rpc;
