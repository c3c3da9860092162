use std::path::PathBuf;

use tracing::debug;

use agentstack_config::{ConfigSource, ResolvedArguments};
use agentstack_topology::Topology;

/// An explicit path wins over SEMAPHORE_AGENT_STACK_CONFIG.
fn source_for(config: Option<PathBuf>) -> ConfigSource {
    match config {
        Some(path) => ConfigSource::File(path),
        None => ConfigSource::detect(),
    }
}

pub(crate) fn resolve(config: Option<PathBuf>) -> anyhow::Result<ResolvedArguments> {
    let source = source_for(config);
    debug!(source = source.kind(), "resolving configuration");
    Ok(agentstack_config::resolve(&source)?)
}

pub fn render(args: &ResolvedArguments, compact: bool) -> anyhow::Result<String> {
    let topology = Topology::derive(args);
    let json = if compact {
        topology.to_json()?
    } else {
        topology.to_json_pretty()?
    };
    Ok(json)
}

pub fn synth(config: Option<PathBuf>, compact: bool) -> anyhow::Result<()> {
    let args = resolve(config)?;
    println!("{}", render(&args, compact)?);
    Ok(())
}
