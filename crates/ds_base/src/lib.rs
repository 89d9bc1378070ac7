//! Library defining cross library helper macros that can be implemented using `#![no_std]`
#![no_std]

// Only holds `#[macro_export]` macros, which live at the crate root
mod helper_macros;
