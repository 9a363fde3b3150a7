//! Range math and section planning.
//!
//! Splits a resource into N sections and computes the inclusive byte ranges
//! sent in HTTP `Range` headers.

mod range;

pub use range::{plan, ByteRange, MAX_SECTIONS};
