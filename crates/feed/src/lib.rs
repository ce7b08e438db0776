//! Feed domain module: posts that point at media stored on an external host.

pub mod post;

pub use post::{MediaKind, NewPost, Post, UploadMeta};
