//! Numerical methods.
//!
//! - `error_metrics`: the five per-step error formulas and the stopping rule
//! - `roots`: scalar root finders
//! - `linear`: stationary iterative solvers and spectral radius
//! - `interpolation`: polynomial and spline interpolants

pub mod error_metrics;
pub mod interpolation;
pub mod linear;
pub mod roots;
