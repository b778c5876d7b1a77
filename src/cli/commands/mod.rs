pub mod article;
pub mod search;
pub mod user;
