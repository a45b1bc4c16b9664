use clap::Parser;
use shortcut::{
    ShortcutResolver,
    cli::{Args, PolicyLoader},
    error::ShortcutError,
};

#[tokio::main]
async fn main() -> Result<(), ShortcutError> {
    env_logger::init();

    let args = Args::parse();

    let policy = PolicyLoader::load(&args)?;
    log::info!(
        "Loaded {} ipv4 and {} ipv6 subnet entries",
        policy.ipv4.len(),
        policy.ipv6.len()
    );
    if policy.is_empty() {
        log::warn!("No trusted subnets configured, every destination will use the proxy");
    }

    let mut shortcut = ShortcutResolver::system(&policy.ipv4, &policy.ipv6)?;
    if let Some(timeout) = policy.lookup_timeout {
        shortcut = shortcut.with_lookup_timeout(timeout);
    }

    for destination in &args.destinations {
        let decision = shortcut.decide(destination).await;
        let route = if decision.allowed { "direct" } else { "proxy" };
        let resolved = decision
            .resolved
            .map_or_else(|| "-".to_string(), |ip| ip.to_string());
        println!("{destination} {route} {resolved}");
    }

    Ok(())
}
