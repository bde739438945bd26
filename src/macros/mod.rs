//! Declarative macros.

#[macro_use]
mod graphql_value;
