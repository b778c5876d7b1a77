pub mod envelope;
pub mod requests;

pub use envelope::Envelope;
pub use requests::Validate;
