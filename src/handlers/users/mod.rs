pub mod list;
pub mod login;
pub mod record;

// Re-export handler functions for use in routing
pub use record::get as user_get;
pub use record::post as user_post;
pub use record::put as user_put;
pub use record::delete as user_delete;

pub use list::all as users_all;
pub use list::from_list as users_list;

pub use login::post as login_post;
pub use login::get as login_get;
