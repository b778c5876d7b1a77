pub mod validate;

pub use validate::{ValidJson, ValidQuery};
