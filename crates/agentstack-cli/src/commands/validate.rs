use std::path::PathBuf;

use agentstack_config::ResolvedArguments;

use super::synth::resolve;

fn summary(args: &ResolvedArguments) -> String {
    format!(
        "✓ Configuration for stack {} is valid\n  Endpoint: {}\n  Dynamic scaling: {}",
        args.stack_name,
        args.effective_endpoint(),
        args.use_dynamic_scaling,
    )
}

pub fn validate(config: Option<PathBuf>) -> anyhow::Result<()> {
    let args = resolve(config)?;
    println!("{}", summary(&args));
    Ok(())
}
