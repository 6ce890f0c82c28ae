//! Top-level facade crate for the QuakeWatch alert receiver.
//!
//! Re-exports the core alert model and the receiver library so users can depend on a single crate.

pub mod core {
    pub use quakewatch_core::*;
}

pub mod receiver {
    pub use quakewatch_receiver::*;
}
