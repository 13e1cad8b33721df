//! Endpoint modules, one router per group

pub mod config;
pub mod health;
pub mod items;
pub mod logs;
pub mod tables;
