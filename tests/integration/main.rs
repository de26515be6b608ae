mod build_tests;
mod cli_tests;
mod common;
mod runtime_tests;
