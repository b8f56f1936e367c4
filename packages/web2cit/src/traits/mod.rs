//! Collaborator traits for the translation engine.
//!
//! These traits define the I/O boundaries the engine depends on. The crate
//! ships `reqwest`-backed implementations in [`crate::clients`] and call-counting
//! mocks in [`crate::testing`].

pub mod citoid;
pub mod fetcher;
pub mod revisions;
