// Seedling: seed-guided topic labeling for Bluesky posts
//
// This is the library root. The core (vocab, encode, model, labels) is pure
// and synchronous; feed, pipeline and output sit around it.

pub mod config;
pub mod corpus;
pub mod encode;
pub mod error;
pub mod feed;
pub mod labels;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod text;
pub mod vocab;

pub use error::TopicError;
