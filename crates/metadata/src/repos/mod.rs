//! Repository traits for metadata operations.

pub mod songs;

pub use songs::SongRepo;
