use crate::support::open_input_or_exit;
use roster_transport::Session;
use std::io::BufRead;

/// Feed each non-empty input line to one session and print its response.
///
/// Handles stay valid across lines, so a file can create an instance and
/// keep using it.
pub fn run(file: Option<String>) {
    let input = open_input_or_exit(file.as_deref());
    let mut session = Session::new();
    for line in input.lines() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error: failed to read input: {e}");
            std::process::exit(1);
        });
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        println!("{}", session.dispatch_json(request));
    }
    tracing::debug!(
        counters = session.live_counters(),
        registries = session.live_registries(),
        "dispatch session closed"
    );
}
