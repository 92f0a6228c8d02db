//! Built-in value checks.

pub mod format;
pub mod length;
pub mod numeric;
pub mod pattern;
pub mod types;

pub use format::FormatCheck;
pub use length::LengthCheck;
pub use numeric::NumericCheck;
pub use pattern::PatternCheck;
pub use types::TypeCheck;
