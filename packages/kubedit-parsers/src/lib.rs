pub mod ast;
pub mod error;
pub mod json;
pub mod traverse;
pub mod yaml;

pub use ast::{MapEntry, MapValue, Range, ResourceParse, Value};
pub use error::Error;
pub use traverse::{ancestors_at, Ancestor, Containment, MapTraversal};
