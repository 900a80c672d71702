//! Document models shared across the crate.
//!
//! These mirror the logical schema of the backing document store: `users`,
//! `friendRequests`, `posts` and per-user camera-roll documents.

mod photo;
mod post;
mod request;
mod user;

pub use photo::{CameraRoll, GeoPoint, PhotoRecord};
pub use post::Post;
pub use request::{FriendRequest, RequestStatus};
pub use user::{User, UserId};
