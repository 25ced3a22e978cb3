pub(crate) mod crop;
pub(crate) mod engine;
pub(crate) mod pipeline;
