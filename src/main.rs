fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Non-interactive payload transcript (deterministic, no network).
    // Prints the save plan for each role, runs a dry-run save and exits 0/1.
    if args.iter().any(|a| a == "--payload-smoke") {
        collab_portal::run_payload_smoke();
        return;
    }

    // Non-interactive onboarding autosave transcript on the dry-run client.
    // Uses the configured debounce and exits 0/1.
    if args.iter().any(|a| a == "--onboarding-smoke") {
        collab_portal::run_onboarding_smoke();
        return;
    }

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame and exits 0.
    // Usage: --tui-smoke or --tui-smoke=editor|brand|toast
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        collab_portal::run_tui_smoke(target);
        return;
    }

    // Interactive editor: --contract=<id> or a bare contract id.
    let contract_id = args
        .iter()
        .skip(1)
        .find_map(|a| a.strip_prefix("--contract=").map(str::to_string))
        .or_else(|| args.get(1).filter(|a| !a.starts_with("--")).cloned())
        .filter(|id| !id.trim().is_empty());

    match contract_id {
        Some(id) => collab_portal::run_tui(id.trim().to_string()),
        None => {
            eprintln!("Usage: collab-portal --contract=<id>");
            eprintln!("       collab-portal --tui-smoke[=editor|brand|toast]");
            eprintln!("       collab-portal --payload-smoke");
            eprintln!("       collab-portal --onboarding-smoke");
            std::process::exit(2);
        }
    }
}
