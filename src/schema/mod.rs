//! Type system: the metadata describing what a document may query.

pub mod meta;
pub mod model;
mod scalars;
