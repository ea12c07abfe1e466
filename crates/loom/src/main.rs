use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error};

use loom_core::kernel::constants;
use loom_core::kernel::{BootOptions, Bootstrap, Error};
use loom_core::loader::{Export, ExportKind, NamespaceTree, select_units};

/// Loom: convention loading and plugin sequencing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    #[command(flatten)]
    boot: BootArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct BootArgs {
    /// Application root
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Framework root, least specific first. Repeatable.
    #[arg(long = "framework", global = true)]
    frameworks: Vec<PathBuf>,

    /// Runtime environment, defaults to LOOM_ENV or "local"
    #[arg(long, global = true)]
    env: Option<String>,

    /// Runtime scope, defaults to LOOM_SCOPE
    #[arg(long, global = true)]
    scope: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List enabled plugins in activation order
    Plugins {
        /// Also list disabled and excluded plugins
        #[arg(long)]
        all: bool,
    },
    /// List load units in order
    Units,
    /// Load a convention directory of every unit and print the namespace
    Tree {
        /// Directory inside each unit, e.g. `service`
        subdir: String,
    },
    /// Check an ordered list of unit names against a convention directory
    Select {
        subdir: String,
        /// Unit names in activation order
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        println!("{} {}: no command given, see --help", constants::APP_NAME, constants::APP_VERSION);
        return ExitCode::SUCCESS;
    };

    match run(&args.boot, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("startup failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn boot_options(args: &BootArgs) -> BootOptions {
    let mut options = BootOptions::from_env(&args.base_dir);
    for framework in &args.frameworks {
        options = options.framework(framework);
    }
    if let Some(env) = &args.env {
        options = options.env(env);
    }
    if let Some(scope) = &args.scope {
        options = options.scope(scope);
    }
    debug!("boot options: {:?}", options);
    options
}

fn run(args: &BootArgs, command: Commands) -> Result<(), Error> {
    let mut boot = Bootstrap::new(boot_options(args));
    boot.load_plugins()?;

    match command {
        Commands::Plugins { all } => print_plugins(&boot, all, args.json),
        Commands::Units => {
            let units = boot.load_units();
            if args.json {
                println!("{}", to_json(&units)?);
            } else {
                for unit in &units {
                    println!("{:?}\t{}", unit.kind, unit.path.display());
                }
            }
            Ok(())
        }
        Commands::Tree { subdir } => {
            let tree = boot.load_convention(&subdir)?;
            print_tree(&tree, args.json)
        }
        Commands::Select { subdir, names } => {
            let tree = boot.load_convention(&subdir)?;
            for (name, export) in select_units(&tree, &names)? {
                println!("{}\t{}", name, describe(export));
            }
            Ok(())
        }
    }
}

fn print_plugins(boot: &Bootstrap, all: bool, json: bool) -> Result<(), Error> {
    if all {
        let plugins: Vec<_> = boot.all_plugins().descriptors().collect();
        if json {
            println!("{}", to_json(&plugins)?);
            return Ok(());
        }
        for plugin in plugins {
            let state = if plugin.enable { "enabled" } else { "disabled" };
            println!("{}\t{}", plugin.name, state);
        }
        return Ok(());
    }

    if json {
        println!("{}", to_json(&boot.plugins())?);
        return Ok(());
    }
    if boot.plugins().is_empty() {
        println!("No plugins enabled.");
    }
    for plugin in boot.plugins() {
        let implicit = boot.implicitly_enabled().iter().any(|a| a.name == plugin.name);
        println!(
            "{}\t{}\t{}{}",
            plugin.name,
            plugin.version.as_deref().unwrap_or("-"),
            plugin.path.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
            if implicit { "\t(implicit)" } else { "" }
        );
    }
    Ok(())
}

fn print_tree(tree: &NamespaceTree, json: bool) -> Result<(), Error> {
    if json {
        let mut object = serde_json::Map::new();
        for path in tree.leaf_paths() {
            if let Some(export) = tree.leaf(&path) {
                let value = export.as_value().cloned().unwrap_or_else(|| describe(export).into());
                object.insert(path, value);
            }
        }
        println!("{}", to_json(&object)?);
        return Ok(());
    }
    for path in tree.leaf_paths() {
        if let Some(export) = tree.leaf(&path) {
            let origin = tree
                .provenance(&path)
                .map(|p| p.origin.display().to_string())
                .unwrap_or_default();
            println!("{}\t{}\t{}", path, describe(export), origin);
        }
    }
    Ok(())
}

fn describe(export: &Export) -> String {
    match export.kind() {
        ExportKind::PlainValue => export.as_value().map(|v| v.to_string()).unwrap_or_default(),
        ExportKind::CallableFactory => "<factory>".to_string(),
        ExportKind::ConstructibleType => "<type>".to_string(),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Other(format!("Failed to render JSON: {}", e)))
}
