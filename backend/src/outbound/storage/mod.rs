//! Avatar file storage adapters.

mod cap_std_avatar_store;

pub use cap_std_avatar_store::{CapStdAvatarStore, PUBLIC_PREFIX};
