//! Line-level revision attribution ("blame").
//!
//! Every stored [`Revision`] carries a run-length attribution of its lines:
//! consecutive lines last introduced by the same revision share one
//! [`BlameSegment`]. A new revision's attribution is derived from the
//! previous one with a line diff: unchanged lines keep their owner, inserted
//! and replaced lines belong to the new revision, deleted lines disappear.
//!
//! # Example
//!
//! ```
//! use namu_blame::Revision;
//! use uuid::Uuid;
//!
//! let r1 = Uuid::new_v4();
//! let r2 = Uuid::new_v4();
//!
//! let first = Revision::first(r1, "a\nb\nc");
//! let second = first.next(r2, "a\nX\nc");
//!
//! assert_eq!(second.line_owners(), vec![r1, r2, r1]);
//! ```

mod revision;

pub use revision::{BlameSegment, Revision, attribute, compress, expand, line_count};
