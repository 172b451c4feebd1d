//! Domain types shared by sinks.

pub mod dest_dir;

pub use dest_dir::DestDir;
