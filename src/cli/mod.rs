//! EP-008: CLI subcommands — init, validate, version, metadata, build, check.

use crate::core::{metadata, parser, requirement, types, version};
use crate::dist::archive;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "empacar",
    version,
    about = "Script packaging — declarative manifests, first-match version resolution, BLAKE3 digests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empacar project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate empacar.yaml without touching any script
    Validate {
        /// Path to empacar.yaml
        #[arg(short, long, default_value = "empacar.yaml")]
        file: PathBuf,
    },

    /// Resolve and print the package version
    Version {
        /// Path to empacar.yaml
        #[arg(short, long, default_value = "empacar.yaml")]
        file: PathBuf,

        /// Resolve directly from a script, bypassing the manifest
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Assemble and emit distribution metadata
    Metadata {
        /// Path to empacar.yaml
        #[arg(short, long, default_value = "empacar.yaml")]
        file: PathBuf,

        /// Output format: pkg-info, yaml or json
        #[arg(long, default_value = "pkg-info")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the source distribution archive
    Build {
        /// Path to empacar.yaml
        #[arg(short, long, default_value = "empacar.yaml")]
        file: PathBuf,

        /// Output directory for the archive
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },

    /// Check the resolved version against a constraint list
    Check {
        /// Path to empacar.yaml
        #[arg(short, long, default_value = "empacar.yaml")]
        file: PathBuf,

        /// Constraints, e.g. ">= 1.2, < 2"
        constraints: String,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Version { file, script } => cmd_version(&file, script.as_deref()),
        Commands::Metadata {
            file,
            format,
            output,
        } => cmd_metadata(&file, &format, output.as_deref()),
        Commands::Build { file, out_dir } => cmd_build(&file, &out_dir),
        Commands::Check { file, constraints } => cmd_check(&file, &constraints),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "empacar", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let manifest_path = path.join("empacar.yaml");
    if manifest_path.exists() {
        return Err(format!("{} already exists", manifest_path.display()));
    }

    std::fs::create_dir_all(path)
        .map_err(|e| format!("cannot create dir {}: {}", path.display(), e))?;

    let template = r#"schema: "1.0"

package:
  name: my-package
  description: "Managed by empacar"

# Script scanned for the __version__ declaration
version_from: my-package

scripts:
  - my-package

requires: []
"#;
    std::fs::write(&manifest_path, template)
        .map_err(|e| format!("cannot write {}: {}", manifest_path.display(), e))?;

    println!("Initialized empacar project at {}", path.display());
    println!("  Created: {}", manifest_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let manifest = parser::parse_manifest_file(file)?;
    let errors = parser::validate_manifest(&manifest);

    if errors.is_empty() {
        println!(
            "OK: {} ({} scripts, {} requirements)",
            manifest.package.name,
            manifest.scripts.len(),
            manifest.requires.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_version(file: &Path, script: Option<&Path>) -> Result<(), String> {
    let resolved = match script {
        Some(path) => version::resolve_version(path).map_err(|e| e.to_string())?,
        None => {
            let manifest = parse_and_validate(file)?;
            let script_path = base_dir(file).join(&manifest.version_from);
            version::resolve_version(&script_path).map_err(|e| e.to_string())?
        }
    };
    println!("{}", resolved);
    Ok(())
}

fn cmd_metadata(file: &Path, format: &str, output: Option<&Path>) -> Result<(), String> {
    let format = metadata::MetadataFormat::parse(format)?;
    let manifest = parse_and_validate(file)?;
    let meta = metadata::assemble(&manifest, &base_dir(file))?;
    let text = metadata::emit(&meta, format)?;

    match output {
        Some(path) => {
            metadata::write_metadata(path, &text)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_build(file: &Path, out_dir: &Path) -> Result<(), String> {
    let manifest = parse_and_validate(file)?;
    let base = base_dir(file);
    let meta = metadata::assemble(&manifest, &base)?;
    let archive_path = archive::build_sdist(&meta, &base, out_dir)?;

    println!("Built {}", archive_path.display());
    for (script, digest) in &meta.scripts {
        println!("  {} {}", script, digest);
    }
    Ok(())
}

fn cmd_check(file: &Path, constraints: &str) -> Result<(), String> {
    let manifest = parse_and_validate(file)?;
    let script_path = base_dir(file).join(&manifest.version_from);
    let resolved = version::resolve_version(&script_path).map_err(|e| e.to_string())?;

    let parsed = requirement::parse_version(&resolved)
        .map_err(|e| format!("resolved version '{}' is not comparable: {}", resolved, e))?;
    let constraints = requirement::parse_constraints(constraints)?;
    if constraints.is_empty() {
        return Err("no constraints given".to_string());
    }

    if requirement::satisfies(&parsed, &constraints) {
        let clauses: Vec<String> = constraints.iter().map(|c| c.to_string()).collect();
        println!("OK: {} satisfies {}", resolved, clauses.join(", "));
        Ok(())
    } else {
        let failed: Vec<String> = constraints
            .iter()
            .filter(|c| !requirement::satisfies(&parsed, std::slice::from_ref(c)))
            .map(|c| c.to_string())
            .collect();
        Err(format!(
            "version {} does not satisfy {}",
            resolved,
            failed.join(", ")
        ))
    }
}

/// Parse and validate a manifest file, returning an error if invalid.
fn parse_and_validate(file: &Path) -> Result<types::PackageManifest, String> {
    let manifest = parser::parse_manifest_file(file)?;
    let errors = parser::validate_manifest(&manifest);
    if errors.is_empty() {
        return Ok(manifest);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

/// Directory the manifest's relative paths resolve against.
fn base_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
