//! Solver backend implementations for classgrid.
//!
//! All backends implement the `classgrid_core::SolverBackend` trait.

pub mod detail;
pub mod http;

pub use detail::error_from_response;
pub use http::HttpSolver;
