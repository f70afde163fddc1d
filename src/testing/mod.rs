//! Headless testing support.
//!
//! Use the [`Pilot`] to drive a [`Window`](crate::window::Window) over the
//! in-memory backend by widget key, without a terminal.

pub mod pilot;

pub use pilot::Pilot;
