//! Wire protocol implementations.
//!
//! The Mojo loader speaks a single request/acknowledge protocol, implemented
//! in [`upload`].

pub mod upload;
