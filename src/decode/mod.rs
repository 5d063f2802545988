//! JSON mapping module
//!
//! [`JsonMapper`] is the single place request payloads are serialized and
//! response bodies are deserialized. Every failure surfaces as
//! [`Error::Mapper`](crate::Error::Mapper) naming the target type.

mod mapper;

pub use mapper::{lenient_datetime, JsonMapper};

#[cfg(test)]
mod tests;
