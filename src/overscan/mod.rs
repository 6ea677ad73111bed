//! Overscan/crop expressions: a compact way to grow or shrink the working resolution.

pub(crate) mod crop;
pub(crate) mod parse;
pub(crate) mod value;

#[cfg(test)]
#[path = "../../tests/unit/overscan/overscan.rs"]
mod tests;
