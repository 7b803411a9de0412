//! Wire types for the Chrome DevTools Protocol target listing.
//!
//! This crate contains the serde-serializable shapes returned by the
//! `/json/list` introspection endpoint of a remote-debugging browser or
//! runtime. Types here are pure data: normalization, filtering and icon
//! enrichment live in `cdpt-rs`.

pub mod target;

pub use target::*;
