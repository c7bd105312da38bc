#[path = "../common/mod.rs"]
mod common;

mod env_tests;
