//! Layer cache state
//!
//! A layer is keyed by the content checksum of the artifact installed into
//! it. Identical checksum implies an identical installed artifact, so the
//! layer can be reused without downloading or verifying anything.
//!
//! # Decisions
//!
//! | Previous record | Resolved checksum | Decision |
//! |-----------------|-------------------|----------|
//! | none | any | Rebuild |
//! | `X` | `X` | Reuse |
//! | `X` | `Y` | Rebuild |

pub mod decision;
pub mod record;

pub use decision::CacheDecision;
pub use record::CacheRecord;
