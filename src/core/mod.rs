pub mod config;
pub mod convert;
pub mod error;
pub mod frame;
pub mod resolve;
pub mod symbols;
pub mod tools;

pub type Address = u64;
