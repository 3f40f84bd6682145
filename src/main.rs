//! mapcat CLI
//!
//! Entry point for the `mapcat` command-line tool.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use mapcat::pipeline::{self, AssumeYes, BuildError, ConfirmGate};
use mapcat::title::MissingTitle;
use mapcat::{discovery, unlisted, CatalogConfig, ConfigOverrides};

#[derive(Parser)]
#[command(name = "mapcat")]
#[command(about = "Multiplayer map catalog regenerator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the config file (default: mapcat.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Client root directory; section names are derived relative to this
    #[arg(long)]
    root: Option<PathBuf>,

    /// Maps tree, relative to the root
    #[arg(long)]
    maps_dir: Option<PathBuf>,

    /// Legacy catalog consulted as fallback source
    #[arg(long)]
    legacy: Option<PathBuf>,

    /// Template the output catalog is seeded from
    #[arg(long)]
    base_template: Option<PathBuf>,

    /// Output catalog path
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the catalog from the maps tree and the legacy catalog
    Build {
        #[command(flatten)]
        config: ConfigArgs,

        /// Proceed without prompting when maps have no valid title
        #[arg(long, short = 'y')]
        yes: bool,

        /// Overwrite an existing output catalog
        #[arg(long)]
        force: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Also write the run summary to this file
        #[arg(long)]
        summary_out: Option<PathBuf>,
    },

    /// Verify the configuration and input paths without building
    Verify {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List release files missing from the version manifest
    NewFiles {
        #[command(flatten)]
        config: ConfigArgs,

        /// Version manifest to check against
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Write the list to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            yes,
            force,
            json,
            summary_out,
        } => run_build(config, yes, force, json, summary_out),
        Commands::Verify { config } => run_verify(config),
        Commands::NewFiles {
            config,
            manifest,
            out,
        } => run_new_files(config, manifest, out),
    }
}

fn load_config(args: ConfigArgs, manifest: Option<PathBuf>) -> Result<CatalogConfig, String> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(mapcat::config::DEFAULT_CONFIG_FILE));

    let base = if path.exists() {
        CatalogConfig::from_file(&path).map_err(|e| e.to_string())?
    } else if args.config.is_some() {
        // an explicitly named config file must exist
        return Err(format!("config file not found: {}", path.display()));
    } else {
        CatalogConfig::default()
    };

    Ok(base.with_overrides(ConfigOverrides {
        root: args.root,
        maps_dir: args.maps_dir,
        legacy_catalog: args.legacy,
        base_template: args.base_template,
        output: args.output,
        version_manifest: manifest,
    }))
}

fn run_build(
    config_args: ConfigArgs,
    yes: bool,
    force: bool,
    json: bool,
    summary_out: Option<PathBuf>,
) {
    let config = match load_config(config_args, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let prompt = StdinConfirm;
    let gate: &dyn ConfirmGate = if yes { &AssumeYes } else { &prompt };

    let summary = match pipeline::build_catalog(&config, gate, force) {
        Ok(summary) => summary,
        Err(BuildError::Aborted(count)) => {
            eprintln!("Aborted; {} map(s) without valid titles. Nothing written.", count);
            process::exit(2);
        }
        Err(BuildError::Config(e)) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Build failed: {}", e);
            process::exit(3);
        }
    };

    if let Some(path) = summary_out {
        if let Err(e) = summary.write_to_file(&path) {
            eprintln!("Warning: could not write run summary: {}", e);
        }
    }

    if json {
        match summary.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(3);
            }
        }
    } else {
        println!("{}", summary.human_summary);
    }
}

fn run_verify(config_args: ConfigArgs) {
    let config = match load_config(config_args, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    match config.validate() {
        Ok(()) => {
            println!("Configuration valid");
            println!();
            println!("  Root: {}", config.root.display());
            println!("  Maps: {}", config.maps_path().display());
            println!("  Legacy catalog: {}", config.legacy_path().display());
            println!("  Base template: {}", config.base_template.display());
            println!("  Output: {}", config.output.display());
            if let Some(ref manifest) = config.version_manifest {
                println!("  Version manifest: {}", manifest.display());
            }
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_new_files(config_args: ConfigArgs, manifest: Option<PathBuf>, out: Option<PathBuf>) {
    let config = match load_config(config_args, manifest) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let manifest_path = match &config.version_manifest {
        Some(path) => path.clone(),
        None => {
            eprintln!("No version manifest configured; pass --manifest or set version_manifest");
            process::exit(1);
        }
    };

    let manifest_content = match std::fs::read_to_string(&manifest_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading manifest {}: {}", manifest_path.display(), e);
            process::exit(1);
        }
    };

    let release_files = match discovery::scan_release_files(&config.root, &config.maps_path()) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error scanning maps: {}", e);
            process::exit(3);
        }
    };

    let maps_prefix = config.maps_dir.to_string_lossy().into_owned();
    let missing = unlisted::find_unlisted(&manifest_content, &maps_prefix, &release_files);

    match out {
        Some(path) => {
            if let Err(e) = unlisted::write_report(&path, &missing) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(3);
            }
            println!(
                "{} file(s) missing from the manifest, written to {}",
                missing.len(),
                path.display()
            );
        }
        None => {
            for path in &missing {
                println!("{}", path);
            }
            eprintln!("{} file(s) missing from the manifest", missing.len());
        }
    }
}

/// Interactive confirm-or-abort gate on stdin
struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm_exclusion(&self, missing: &[MissingTitle]) -> bool {
        eprintln!("Unable to find valid names for {} map(s):", missing.len());
        for entry in missing {
            eprintln!("  {}", entry.to_human());
        }
        eprint!("Continue? Maps with missing names will not be processed [y/N] ");
        let _ = io::stderr().flush();
        get_yes_no()
    }
}

/// Read one line from stdin; `true` only for an explicit leading y/Y
fn get_yes_no() -> bool {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    line.trim_start().chars().next().is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}
