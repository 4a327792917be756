//! Utilities shared by the Tsudoi packages.

pub mod logger;
pub mod time;
