pub mod list;
pub mod record;
pub mod search;

// Re-export handler functions for use in routing
pub use record::get as article_get;
pub use record::post as article_post;
pub use record::put as article_put;
pub use record::delete as article_delete;

pub use list::all as articles_all;
pub use list::from_list as articles_list;
pub use list::by_title as article_by_title;

pub use search::search as articles_search;
pub use search::recommendation as articles_recommendation;
pub use search::keywords as keywords_post;
pub use search::categories as categories_post;
