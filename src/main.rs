//! CLI entry point for barrel

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use barrel::{
    Config, ConfigFile, ConsoleFormatter, OptionsOverride, OutputConfig, PathResult, PathSpec,
    discover, print_json, run_plan, watch,
};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "barrel")]
#[command(about = "Generate index files that re-export the modules of a directory")]
#[command(version)]
struct Args {
    /// Directories to synchronize (replace the paths of the config file)
    paths: Vec<String>,

    /// Extension of the generated index file
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    extension: Option<String>,

    /// Base name of the generated index file
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Skip modules: bare name, /regex/ or glob (can be used multiple times)
    #[arg(short = 'i', long = "ignore", value_name = "IGNORE")]
    ignore: Vec<String>,

    /// Do not export declared sub-directories as nested modules
    #[arg(long = "no-recursion")]
    no_recursion: bool,

    /// Extension of exported modules (defaults to the index extension)
    #[arg(long = "module-extension", value_name = "EXT")]
    module_extension: Option<String>,

    /// Keep the module extension in import paths
    #[arg(long = "module-extension-in-path")]
    module_extension_in_path: bool,

    /// Append /<name>.<extension> to nested module paths
    #[arg(long = "file-extension-in-path")]
    file_extension_in_path: bool,

    /// Append /<name> to nested module paths
    #[arg(long = "file-name-in-path")]
    file_name_in_path: bool,

    /// Line template for a module, with {name} and {path}
    #[arg(long = "module-template", value_name = "T")]
    module_template: Option<String>,

    /// Line template for a nested module, with {name} and {path}
    #[arg(long = "recursion-template", value_name = "T")]
    recursion_template: Option<String>,

    /// Aggregate export line for nested modules, with {moduleList}
    #[arg(long = "recursion-template-export", value_name = "T")]
    recursion_template_export: Option<String>,

    /// Print one line per processed directory
    #[arg(short = 'l', long = "log")]
    log: bool,

    /// Dry run: report what would change without writing
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Keep running and re-synchronize on file changes
    #[arg(short = 'w', long = "watch")]
    watch: bool,

    /// Quiet period before handling a batch of changes (e.g. 100ms, 1s)
    #[arg(long = "debounce", value_name = "DURATION", value_parser = parse_duration_string)]
    debounce: Option<Duration>,

    /// Also synchronize every directory containing a .barrelrc.json marker
    #[arg(long = "discover")]
    discover: bool,

    /// Output results in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Config file to use instead of searching for one
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,
}

impl Args {
    /// Configuration given on the command line.
    fn to_config(&self) -> Config {
        Config {
            log: self.log,
            test: self.test,
            watch: self.watch,
            paths: self
                .paths
                .iter()
                .map(|p| PathSpec::Path(p.clone()))
                .collect(),
            options: OptionsOverride {
                file_extension: self.extension.clone(),
                file_extension_in_path: self.file_extension_in_path.then_some(true),
                file_name: self.name.clone(),
                file_name_in_path: self.file_name_in_path.then_some(true),
                ignore_files: (!self.ignore.is_empty()).then(|| self.ignore.clone()),
                module_extension: self.module_extension.clone(),
                module_extension_in_path: self.module_extension_in_path.then_some(true),
                module_template: self.module_template.clone(),
                recursion: self.no_recursion.then_some(false),
                recursion_template: self.recursion_template.clone(),
                recursion_template_export: self.recursion_template_export.clone(),
            },
        }
    }
}

/// Parse a duration string like "100ms" or "2s" with humantime.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("barrel=warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merge the config file (explicit or discovered) with the command line.
fn load_config(args: &Args, cwd: &Path) -> barrel::Result<Config> {
    let file = match &args.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::discover(cwd)?,
    };
    let config = file
        .map(|f| f.config)
        .unwrap_or_default()
        .merge(args.to_config());

    if args.discover {
        discover::extend(config, cwd)
    } else {
        Ok(config)
    }
}

fn print_results(
    results: &[PathResult],
    json: bool,
    formatter: &mut ConsoleFormatter,
) -> io::Result<()> {
    if json {
        print_json(results)
    } else {
        formatter.print(results)
    }
}

fn main() {
    let args = Args::parse();
    init_tracing();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = load_config(&args, &cwd).unwrap_or_else(|e| {
        eprintln!("barrel: {}", e);
        process::exit(1);
    });
    let plan = config.plan().unwrap_or_else(|e| {
        eprintln!("barrel: {}", e);
        process::exit(1);
    });

    let mut formatter = ConsoleFormatter::new(OutputConfig {
        use_color: should_use_color(args.color),
        log: config.log,
    });

    if config.watch {
        let debounce = args.debounce.unwrap_or(watch::DEFAULT_DEBOUNCE);
        let result = watch::watch(&plan, config.test, debounce, |results| {
            if let Err(e) = print_results(&results, args.json, &mut formatter) {
                eprintln!("barrel: error writing output: {}", e);
            }
        });
        if let Err(e) = result {
            eprintln!("barrel: {}", e);
            process::exit(1);
        }
        return;
    }

    let results = run_plan(&plan, config.test);
    if let Err(e) = print_results(&results, args.json, &mut formatter) {
        eprintln!("barrel: error writing output: {}", e);
        process::exit(1);
    }
    if !results.iter().all(PathResult::is_ok) {
        process::exit(1);
    }
}
