pub(crate) mod bootstrap;
pub(crate) mod showcase;
