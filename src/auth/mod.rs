pub mod password;

pub use password::{hash_password, verify_password, PasswordError, MIN_BCRYPT_COST};
