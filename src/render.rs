pub(crate) mod avatar;
pub(crate) mod cpu;
pub(crate) mod scene;
pub(crate) mod shadow;
pub(crate) mod surface;
pub(crate) mod tint;
