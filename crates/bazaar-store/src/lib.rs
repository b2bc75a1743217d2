//! Cart and wishlist persistence with automatic local fallback.
//!
//! A [`CollectionStore`] talks to a remote collection API while it is
//! reachable and switches permanently to a [`LocalStore`] after the first
//! remote failure.

pub mod collection;
pub mod error;
pub mod kind;
pub mod local;
pub mod mode;
pub mod remote;
mod retry;

pub use collection::{CartStore, CollectionStore, WishlistStore};
pub use error::{LocalStoreError, StoreError, TransportError};
pub use kind::{Cart, CollectionKind, Wishlist};
pub use local::{read_items, write_items, FileStore, LocalStore, MemoryStore};
pub use mode::{ModeState, StoreMode};
pub use remote::{RemoteCollectionClient, DEMO_USER_HEADER};
