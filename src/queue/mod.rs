//! Bounded job storage for the pool monitor.
//!
//! [`JobRing`] is a fixed-capacity circular buffer of [`BoxedJob`]s with an
//! insert cursor, a remove cursor and an occupied-slot count. It performs no
//! synchronization of its own: the pool keeps it inside its single lock, so
//! every read or mutation of the cursors and count is serialized there.
//!
//! [`BoxedJob`]: crate::core::BoxedJob

mod ring;

pub use ring::{Drain, JobRing};
