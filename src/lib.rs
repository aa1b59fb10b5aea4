//! persona-boot: command-line front end for the persona bootstrap

pub mod logging;
pub mod report;
