use roster_transport::transport_check;

/// Exit status is 1 when any dispatched action misbehaved.
pub fn run(json_output: bool) {
    let report = transport_check();

    if json_output {
        let rendered = serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
            eprintln!("error: failed to render check report: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
    } else {
        println!(
            "roster check: {} ({} requests, {}/{} actions exercised)",
            report.result, report.requests, report.actions_exercised, report.action_count
        );
        for issue in &report.issues {
            println!("  {} [{}] {}", issue.action, issue.failure_class, issue.message);
        }
    }

    if !report.is_accepted() {
        std::process::exit(1);
    }
}
