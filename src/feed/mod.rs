pub mod file;
pub mod http;
pub mod loader;
pub mod traits;

pub use file::FileFeedFetch;
pub use http::HttpFeedFetch;
pub use loader::FeedLoader;
pub use traits::FeedFetch;
