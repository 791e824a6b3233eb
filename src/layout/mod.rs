//! Structure layout index and resolver
//!
//! [`IndexBuilder`] walks debug entries once and produces a frozen
//! [`TypeIndex`], which answers "what is the layout of type X" queries.

pub mod error;
pub mod index;
pub mod resolve;
pub mod types;

pub use error::{IndexFault, StreamError};
pub use index::{IndexBuilder, TypeIndex};
pub use types::{Alias, Field, Type};
