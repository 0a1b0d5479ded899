//! # FLEVA Shared
//!
//! Wire representations exchanged with the posts API.
//! Kept free of domain types so the same crate can describe the server side.

pub mod dto;
pub mod response;

pub use dto::{CreatePostRequest, PostDto, UpdatePostRequest, WireId};
pub use response::ErrorResponse;
