//! Discover GitHub repositories and score them against evaluation rules.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use repo_scout_lib::{Host, run};
use std::io::{Write, stderr, stdout};
use std::process::ExitCode;

/// Host bound to the terminal of the running process.
#[derive(Debug, Clone, Copy, Default)]
struct ConsoleHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for ConsoleHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> ExitCode {
    match run(&mut ConsoleHost, std::env::args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(stderr(), "{e:#}");
            ExitCode::FAILURE
        }
    }
}
