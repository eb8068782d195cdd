#![cfg(test)]

pub mod common;
pub mod config_tests;
pub mod pipeline_tests;
