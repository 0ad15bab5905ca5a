//! # YardPlan Core
//!
//! Core types and utilities shared by the YardPlan crates:
//! error taxonomy, unit conversions between feet, pixels and 3D world
//! units, and the planar polygon algorithms used for lots and custom
//! house outlines.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod units;

pub use error::{AssetError, DesignFileError, Error, Result, ValidationError};
pub use geometry::{Bounds, Point};
