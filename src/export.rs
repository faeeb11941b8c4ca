//! Export pipeline: drives the scene renderer over synthetic frame times and streams the
//! frames into a [`FrameSink`](crate::FrameSink).

pub(crate) mod destination;
pub(crate) mod job;
pub(crate) mod observer;
pub(crate) mod pipeline;
pub(crate) mod plan;
