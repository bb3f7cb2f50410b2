use clap::{Parser, Subcommand};
use mm_engine::{EngineConfig, Network};
use mm_properties::{BUNDLE_NAMES, Category, MaterialSpec, PropResult, by_name};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mm-cli")]
#[command(about = "MechMat CLI - linked material property bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available property bundles
    Bundles,
    /// Build a bundle, apply writes in order and print the resulting state
    Eval {
        /// Bundle name (see `bundles`)
        bundle: String,
        /// Write an attribute, e.g. --set "density=997 kg/m^3"
        #[arg(short, long = "set", value_name = "ATTR=VALUE")]
        sets: Vec<String>,
        /// Material name
        #[arg(long)]
        name: Option<String>,
        /// Material category (metal, plastic, fluid, ...)
        #[arg(long)]
        category: Option<Category>,
        /// Engine configuration YAML file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the result as a material file
        #[arg(long)]
        yaml: bool,
    },
    /// Load a material file and print its state
    Load {
        /// Path to the material YAML file
        path: PathBuf,
        /// Engine configuration YAML file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the documentation and formulas of every attribute in a bundle
    Describe {
        /// Bundle name (see `bundles`)
        bundle: String,
    },
}

fn main() -> PropResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bundles => cmd_bundles(),
        Commands::Eval {
            bundle,
            sets,
            name,
            category,
            config,
            yaml,
        } => {
            let spec = MaterialSpec {
                bundle,
                name,
                category,
                set: sets,
            };
            cmd_eval(&spec, config.as_deref(), yaml)
        }
        Commands::Load { path, config } => {
            let spec = MaterialSpec::load(&path)?;
            info!(path = %path.display(), bundle = %spec.bundle, "loaded material");
            cmd_eval(&spec, config.as_deref(), false)
        }
        Commands::Describe { bundle } => cmd_describe(&bundle),
    }
}

fn cmd_bundles() -> PropResult<()> {
    for name in BUNDLE_NAMES {
        let schema = by_name(name)?;
        println!("{name:<10} {}", schema.kind());
    }
    Ok(())
}

fn cmd_eval(spec: &MaterialSpec, config: Option<&Path>, yaml: bool) -> PropResult<()> {
    let config = match config {
        Some(path) => {
            info!(path = %path.display(), "loading engine config");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    let mut net = Network::with_config(config);
    let id = spec.instantiate(&mut net)?;

    if yaml {
        print!("{}", MaterialSpec::snapshot(&net, id)?.to_yaml_string()?);
        return Ok(());
    }

    let entity = net.entity(id)?;
    println!("{entity}");
    for (field, value) in entity.state() {
        println!("  {field:<34} {value}");
    }
    Ok(())
}

fn cmd_describe(bundle: &str) -> PropResult<()> {
    let schema = by_name(bundle)?;
    println!("{}", schema.kind());
    for attribute in schema.state_names() {
        let Some(guard) = schema.guard(attribute) else {
            continue;
        };
        println!("  {}", guard.describe(attribute));
        for transform in schema.transforms().get(attribute).into_iter().flatten() {
            let params: Vec<&str> = transform.args.iter().map(|(p, _)| p.as_str()).collect();
            println!("      <- {}({})", transform.formula.name(), params.join(", "));
        }
    }
    Ok(())
}
