//! Text annotation: contact normalization and linkification.

pub mod links;

pub use links::{linkify, normalize_tel, normalize_url, Segment};
