pub(crate) mod noise;
pub(crate) mod system;
