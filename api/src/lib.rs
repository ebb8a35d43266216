//! HTTP surface shared by the customer registry and product catalog binaries.

pub mod config;
pub mod routes;
pub mod startup;

pub use routes::{build_info_router, build_router};
