use std::time::Instant;

use tracing::debug;

/// Runs UI-triggered work (file dialogs, parsing, writes) inline on the
/// event handler and logs how long it took.
pub fn run_blocking<F, T>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let value = f();
    debug!(task = label, elapsed_ms = started.elapsed().as_millis() as u64, "blocking task finished");
    value
}
