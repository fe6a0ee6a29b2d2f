#![forbid(unsafe_code)]

//! Data-side building blocks for fbind.
//!
//! - [`value`]: the type-erased [`Value`] exchanged with control properties.
//! - [`numeric`]: [`NumericKind`] and canonical `f64` conversions.
//! - [`record`]: the [`Record`] / [`FieldValue`] accessor capability and the
//!   [`impl_record!`] generator.
//! - [`path`]: [`BindingPath`] parsing and dotted-path resolution.
//! - [`error`]: [`BindingError`].

pub mod error;
pub mod numeric;
pub mod path;
pub mod record;
pub mod value;

pub use error::BindingError;
pub use numeric::{FloatWidth, IntWidth, Numeric, NumericKind, from_canonical, to_canonical};
pub use path::{BindingPath, resolve_field};
pub use record::{FieldValue, Indirection, Record};
pub use value::{Value, ValueError};
