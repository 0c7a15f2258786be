mod basic_test;
mod shared_test;

#[path = "../utils/mod.rs"]
mod utils;
