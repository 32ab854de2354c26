use csv_converter::{ConfigOverrides, CsvConverterStack, StackConfig};

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

/// Synthesize the CSV converter deployment template
#[derive(Debug, Parser)]
#[command(version)]
struct Opt {
    /// JSON stack configuration; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the template here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long)]
    stack_name: Option<String>,

    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    #[arg(long, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,

    /// Deployment environment (`prod` enables hardening)
    #[arg(long)]
    environment: Option<String>,

    /// Empty the bucket on removal; must be `false` with `--environment prod`
    #[arg(long)]
    auto_delete_objects: Option<bool>,

    /// Emit compact JSON
    #[arg(long)]
    compact: bool,
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(io::stderr)
        .init();
}

fn load_config(opt: &Opt) -> anyhow::Result<StackConfig> {
    let mut config = match &opt.config {
        Some(path) => StackConfig::load(path)?,
        None => StackConfig::default(),
    };

    config.apply(ConfigOverrides {
        stack_name: opt.stack_name.clone(),
        account: opt.account.clone(),
        region: opt.region.clone(),
        environment: opt.environment.clone(),
        auto_delete_objects: opt.auto_delete_objects,
    });

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    setup_tracing();

    let config = load_config(&opt)?;
    let deployment = CsvConverterStack::build(&config)?;
    let template = deployment.synth()?;

    let json = if opt.compact {
        template.to_json()?
    } else {
        template.to_json_pretty()?
    };

    match &opt.output {
        Some(path) => {
            fs::write(path, json.as_bytes())?;
            info!(path = %path.display(), "template written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
