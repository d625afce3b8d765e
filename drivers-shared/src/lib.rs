#![cfg_attr(not(test), no_std)]

pub mod max30102;

pub use num_enum;
