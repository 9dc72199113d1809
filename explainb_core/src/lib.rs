pub mod classify;
pub mod diff;
pub mod error;
pub mod explain;
pub mod matcher;
pub mod normalize;
pub mod report;

#[cfg(test)]
mod diff_test;
#[cfg(test)]
mod report_test;

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
