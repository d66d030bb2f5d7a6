use anyhow::{Context, Result};
use log::debug;

use swiftfire::config::SimConfig;
use swiftfire::net::DEFAULT_CONFIGURATION;
use swiftfire::options::Options;
use swiftfire::simulation::Runner;

fn main() -> Result<()> {
    if std::env::var("SWIFTFIRE_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("SWIFTFIRE_LOG")
            .write_style("SWIFTFIRE_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    let env_flags = std::env::var("SWIFTFIRE_FLAGS").unwrap_or_default();
    args.extend(shellwords::split(&env_flags).context("Malformed SWIFTFIRE_FLAGS")?);

    let options = Options::parse_from_args(&args)?;
    debug!("swiftfire options: {:?}", options);

    let config = match &options.config {
        Some(path) => SimConfig::load_from_file(path)?,
        None => SimConfig::default(),
    };
    let config = options.merge_into(config);
    debug!("simulation config: {:?}", config);

    let mut net = options.build_net()?;
    if config.configuration != DEFAULT_CONFIGURATION {
        let initial = net
            .current_marking(DEFAULT_CONFIGURATION)
            .cloned()
            .unwrap_or_default();
        net.add_configuration(config.configuration.as_str(), initial, options.final_markings.iter().cloned())
            .with_context(|| format!("Failed to add configuration {:?}", config.configuration))?;
    }

    let mut runner = match config.seed {
        Some(seed) => Runner::with_seed(config.max_steps, seed),
        None => Runner::new(config.max_steps),
    }
    .stop_at_final(config.stop_at_final);

    let trace = runner.run(&mut net, &config.configuration)?;
    println!("trace: {trace}");
    println!("steps: {}", trace.len());
    println!("stopped: {}", trace.stop_reason);
    println!("marking: {}", trace.final_marking);
    Ok(())
}
