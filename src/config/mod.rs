pub(crate) mod model;
pub(crate) mod resolve;
pub(crate) mod settings;
pub(crate) mod tags;
