pub mod cache;

pub use cache::DigestCache;

pub mod prelude {
    pub use super::cache::DigestCache;
    pub use hn_core::{Digest, DigestBuilder, Result};
}
