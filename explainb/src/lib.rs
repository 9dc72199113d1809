pub mod args;
pub mod executor;
pub mod process;
pub mod render;
pub mod run;
pub mod sql;
pub mod trace;

#[cfg(test)]
mod run_test;
