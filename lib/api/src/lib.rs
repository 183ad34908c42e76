//! HTTP surface of motiondx.

pub mod rest;

pub use rest::{configure, ApiError, AppState, RestApi};
