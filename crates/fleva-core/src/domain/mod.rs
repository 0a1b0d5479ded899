//! Domain entities - posts, their form input and the acting user.

mod actor;
mod image;
mod post;

pub use actor::ActorId;
pub use image::{ImageUpload, image_path};
pub use post::{
    BODY_MIN_CHARS, DEFAULT_COMMUNITY, DEFAULT_TAG, Post, PostField, PostFields, PostId,
    PostOrder, PostUpdate, TITLE_MAX_CHARS, ValidationErrors, create_post, create_post_at,
    validate_post,
};
