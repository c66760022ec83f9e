//! Command handlers -- one module per mode of operation

pub mod list;
pub mod run;
