pub(crate) mod replay;
pub(crate) mod stroke;
