//! bgclear command-line tool
//!
//! Makes uniform light or dark image backgrounds transparent using the
//! bgclear library.

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    bgclear::cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
