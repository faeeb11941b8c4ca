//! Frame sinks.
//!
//! A sink consumes rendered frames in export order and turns them into a file: an external
//! `ffmpeg` process for `mov`/`webm`, or the in-process APNG encoder.

/// In-process animated PNG sink.
pub mod apng;
/// `ffmpeg`-based sink (external process fed PNG frames over stdin).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
