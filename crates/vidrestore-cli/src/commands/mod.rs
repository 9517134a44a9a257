pub mod analyze;
pub mod config;
pub mod frame;
pub mod info;
pub mod run;
pub mod stages;
