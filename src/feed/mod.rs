// Microblog feed — post retrieval from Bluesky and the raw feed file.
//
// The topic pipeline only needs raw post strings in a stable order. This
// module hides where they come from behind the FeedSource trait; the Bluesky
// implementation authenticates once; hashtag searches are paced by a
// SearchThrottle.

pub mod client;
pub mod posts;
pub mod raw;
pub mod throttle;
pub mod traits;

pub use raw::RawPost;
pub use traits::{BlueskyFeed, FeedSource};
