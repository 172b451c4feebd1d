//! Archive format sinks.

pub mod zip;

pub use self::zip::ZipSink;
pub use self::zip::ZipTarget;
