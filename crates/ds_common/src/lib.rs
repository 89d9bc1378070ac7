//! Common containers, built on top of `ds_base` and `ds_logging`.

pub mod collections;

#[doc(hidden)]
pub use ds_base::count_exprs;
