//! Storyblok Zod CLI
//!
//! Generates the Zod schema module for one Storyblok space.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use storyblok_zod::{generate, GenConfig, StructuralConverter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storyblok-zod")]
#[command(about = "Generate Zod schemas from Storyblok component definitions")]
#[command(version)]
struct Cli {
    /// Space id; selects the components subfolder to process
    #[arg(short, long, required_unless_present = "print_config")]
    space: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Input root holding components/ and types/
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Type-definitions file, relative to the root unless absolute
    #[arg(short, long)]
    types: Option<PathBuf>,

    /// Additional configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Send array-extension interfaces through the converter as well
    #[arg(long)]
    no_array_bypass: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Flags override every configuration layer
    fn apply(&self, config: &mut GenConfig) {
        if let Some(root) = &self.root {
            config.input.root = root.clone();
        }
        if let Some(types) = &self.types {
            config.input.types_file = types.clone();
        }
        if let Some(out) = &self.out {
            config.output.path = Some(out.clone());
        }
        if self.no_array_bypass {
            config.codegen.array_extension_bypass = false;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = GenConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml().context("failed to render configuration")?);
        return Ok(());
    }

    let Some(space) = cli.space.as_deref() else {
        bail!("a space id is required");
    };

    if let Some(path) = &config.output.path {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            if !parent.is_dir() {
                bail!("output directory {} does not exist", parent.display());
            }
        }
    }

    let output = generate(&config, space, &StructuralConverter::new())
        .with_context(|| format!("failed to generate schemas for space {}", space))?;

    match &config.output.path {
        Some(path) => {
            fs::write(path, format!("{}\n", output.code))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote schemas");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", output.code).context("failed to write to stdout")?;
        }
    }

    let warnings = output.report.warning_count();
    tracing::info!(
        components = output.component_count,
        natives = output.native_count,
        warnings,
        notes = output.report.len() - warnings,
        "done"
    );
    if !output.report.is_empty() {
        tracing::debug!("run report:\n{}", output.report);
    }

    Ok(())
}
