//! Conversions from and to external data formats.

#[doc(hidden)]
pub mod serde;
