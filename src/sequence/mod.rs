pub(crate) mod collection;
pub(crate) mod gaps;
