use roster_transport::action_rows;

pub fn run(json_output: bool) {
    let rows = action_rows();

    if json_output {
        let rendered = serde_json::to_string_pretty(&rows).unwrap_or_else(|err| {
            eprintln!("error: failed to render action table: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    println!("roster actions ({})", rows.len());
    for row in rows {
        let access = if row.mutates { "mut" } else { "ref" };
        println!("  {:<22} {:<3} {}", row.action, access, row.operation);
    }
}
