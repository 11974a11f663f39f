//! Foundation types for the Folio document store.
//!
//! Every other Folio crate depends on `folio-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`Identity`] -- Validated author/committer string (`Name <email>`)
//! - [`Timestamp`] -- Commit time with a fixed UTC offset

pub mod error;
pub mod identity;
pub mod object;
pub mod timestamp;

pub use error::TypeError;
pub use identity::Identity;
pub use object::ObjectId;
pub use timestamp::Timestamp;
