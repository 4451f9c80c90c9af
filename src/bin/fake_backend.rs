//! Stand-in for the Python backend test entrypoint, used by integration tests.
//!
//! Invoked as `fake_backend <script> <selector>`. `GBF_FAKE_BACKEND_MODE` picks the
//! behavior: `success` (default), `fail`, `silent`, `error`, or `hang`.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

fn main() -> ExitCode {
    let selector = env::args().last().unwrap_or_default();
    let service = match selector.as_str() {
        "9" => "Twitter",
        "10" => "Discord",
        other => {
            eprintln!("unknown test selector {other:?}");
            return ExitCode::from(2);
        }
    };
    let mode = env::var("GBF_FAKE_BACKEND_MODE").unwrap_or_else(|_| "success".to_string());

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\x1b[36m[INFO]\x1b[0m Testing {service} credentials...");
    let _ = stdout.flush();

    match mode.as_str() {
        "success" => {
            let _ = writeln!(stdout, "[{service}] Test successfully completed.");
            ExitCode::SUCCESS
        }
        "fail" => {
            let _ = writeln!(stdout, "[{service}] Test failed.");
            ExitCode::SUCCESS
        }
        "silent" => ExitCode::SUCCESS,
        "error" => {
            eprintln!("Traceback (most recent call last): credentials rejected");
            ExitCode::FAILURE
        }
        "hang" => {
            drop(stdout);
            thread::sleep(Duration::from_secs(120));
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("unknown GBF_FAKE_BACKEND_MODE {other:?}");
            ExitCode::from(2)
        }
    }
}
