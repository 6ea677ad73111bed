pub(crate) mod command;
pub(crate) mod convert;
pub(crate) mod paths;
pub(crate) mod probe;
pub(crate) mod runner;
pub(crate) mod template;
