pub mod longform;
pub mod resolve;

pub use longform::resolve_long_form;
pub use resolve::{resolve, resolve_from_ops};
