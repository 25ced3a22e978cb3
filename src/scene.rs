pub(crate) mod placement;
pub(crate) mod request;
pub(crate) mod theme;
