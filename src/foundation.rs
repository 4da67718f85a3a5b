pub(crate) mod check;
pub mod error;
