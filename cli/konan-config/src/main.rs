//! konan-config: inspect Konan toolchain properties and per-target platforms.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::get::Scope;
use config::{parse_override, CliOverrides, KonanConfig, Settings};
use konan_platform::LinkOptions;

#[derive(Parser)]
#[command(
    name = "konan-config",
    version,
    about = "Inspect Konan toolchain properties and platforms"
)]
struct Cli {
    /// Property file (default: from konan.toml, else ./konan.properties)
    #[arg(long, global = true)]
    properties: Option<PathBuf>,
    /// Dependency base directory (default: from konan.toml, else ./dependencies)
    #[arg(long, global = true)]
    dependencies: Option<PathBuf>,
    /// Host target (default: detected from the running machine)
    #[arg(long, global = true)]
    host: Option<String>,
    /// Override a property, e.g. --override linkerKonanFlags.linux=-lm
    #[arg(long = "override", value_name = "KEY=VALUE", global = true, value_parser = parse_override)]
    overrides: Vec<(String, String)>,
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the host and the targets enabled on it
    Targets,
    /// Show the resolved properties of a target
    Describe {
        /// Target name ("host" for the host)
        target: String,
    },
    /// Look up a single property
    Get {
        /// Property key without qualifier (e.g. linkerKonanFlags)
        key: String,
        /// Target to resolve for (default: host)
        #[arg(long)]
        target: Option<String>,
        /// Qualifier to apply
        #[arg(long, value_enum, default_value_t = Scope::Target)]
        scope: Scope,
        /// Split the value into a list
        #[arg(long)]
        list: bool,
    },
    /// Download the dependencies of one or all enabled targets
    Deps {
        /// Only this target (default: host and all enabled targets)
        #[arg(long)]
        target: Option<String>,
    },
    /// Print the clang command line for a target
    Clang {
        /// Target name
        target: String,
        /// Include the defines used for runtime sources
        #[arg(long)]
        konan_sources: bool,
    },
    /// Print the linker command line for a target
    Link {
        /// Target name
        target: String,
        /// Output file
        #[arg(short, long)]
        output: String,
        /// Object files to link
        objects: Vec<String>,
        #[arg(long)]
        optimize: bool,
        #[arg(long)]
        debug_info: bool,
        /// Produce a shared library
        #[arg(long)]
        dynamic: bool,
    },
    /// Validate references in the property file
    Check,
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = KonanConfig::find_and_load(&cwd)?;

    logging::init(
        cli.debug,
        config
            .as_ref()
            .and_then(|(c, _)| c.logging.level.as_deref()),
    );
    if let Some((_, dir)) = &config {
        tracing::debug!(dir = %dir.display(), "using konan.toml");
    }

    let overrides = CliOverrides {
        properties: cli.properties,
        dependencies: cli.dependencies,
        host: cli.host,
        overrides: cli.overrides,
    };
    let settings = Settings::resolve(
        &overrides,
        config.as_ref().map(|(c, dir)| (c, dir.as_path())),
        &cwd,
    );

    match cli.command {
        Commands::Targets => commands::targets::run(&settings.open()?),

        Commands::Describe { target } => commands::describe::run(&settings.open()?, &target),

        Commands::Get {
            key,
            target,
            scope,
            list,
        } => commands::get::run(&settings.open()?, &key, target.as_deref(), scope, list),

        Commands::Deps { target } => commands::deps::run(&settings.open()?, target.as_deref()),

        Commands::Clang {
            target,
            konan_sources,
        } => commands::clang::run(&settings.open()?, &target, konan_sources),

        Commands::Link {
            target,
            output,
            objects,
            optimize,
            debug_info,
            dynamic,
        } => {
            let options = LinkOptions {
                optimize,
                debug: debug_info,
                dynamic,
            };
            commands::link::run(&settings.open()?, &target, &output, &objects, &options)
        }

        Commands::Check => commands::check::run(&*settings.load_store()?),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// konan.toml discovery → settings → platform manager → commands.
    #[test]
    fn config_to_commands_workflow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("konan.toml"),
            r#"
[toolchain]
properties = "etc/konan.properties"
host = "linux"
targets = ["linux", "wasm32"]

[overrides]
"linkerKonanFlags.wasm32" = "--allow-undefined --no-entry"
"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("etc")).unwrap();
        std::fs::write(
            dir.path().join("etc/konan.properties"),
            "llvmHome = llvm\n\
             targetToolchain.linux-wasm32 = wasm\n\
             targetToolchain.linux-linux = gcc\n\
             targetSysRoot.linux = sysroot\n\
             quadruple.wasm32 = wasm32-unknown-unknown\n\
             linkerKonanFlags.wasm32 = --allow-undefined\n",
        )
        .unwrap();
        let nested = dir.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, config_dir) = KonanConfig::find_and_load(&nested).unwrap().unwrap();
        let settings = Settings::resolve(
            &CliOverrides::default(),
            Some((&config, config_dir.as_path())),
            &nested,
        );
        assert_eq!(settings.dependencies, dir.path().join("dependencies"));

        let manager = settings.open().unwrap();
        assert_eq!(manager.enabled().len(), 2);

        commands::targets::run(&manager).unwrap();
        commands::describe::run(&manager, "wasm32").unwrap();
        commands::get::run(&manager, "linkerKonanFlags", Some("wasm32"), Scope::Target, true)
            .unwrap();
        commands::clang::run(&manager, "wasm32", true).unwrap();
        commands::link::run(
            &manager,
            "wasm32",
            "app.wasm",
            &["main.o".to_string()],
            &LinkOptions::default(),
        )
        .unwrap();
        commands::check::run(&settings.load_store().unwrap()).unwrap();

        let wasm = manager.resolve("wasm32").unwrap();
        let linker = wasm.linker().unwrap();
        let cmd = linker.link_command(&["main.o".to_string()], "app.wasm", &LinkOptions::default());
        assert!(cmd.ends_with(&["--allow-undefined".to_string(), "--no-entry".to_string()]));
    }

    #[test]
    fn missing_property_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            host: Some("linux".into()),
            ..CliOverrides::default()
        };
        let settings = Settings::resolve(&cli, None, dir.path());
        let err = settings.open().unwrap_err();
        assert!(format!("{err:#}").contains("konan.properties"));
    }
}
