use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use rosdoc2_settings::{
    find_package_xml, generate_default_config_file_in, inspect_package_for_settings,
    resolve_config_text, should_use_colors, BuilderSettings, Colors, PackageManifest,
    PackageMetadata, SettingsSection, ToolOptions,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rosdoc2-settings")]
#[command(version, about = "Resolve rosdoc2 documentation settings for a ROS package")]
struct Cli {
    /// Package directory or path to its package.xml
    package: PathBuf,

    /// Print the configuration text instead of the parsed settings
    #[arg(long, conflicts_with = "init")]
    print_config: bool,

    /// Write the default rosdoc2.yaml into the package directory
    #[arg(long)]
    init: bool,

    /// Tool option passed through to the build context (repeatable)
    #[arg(short, long = "option", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    options: Vec<(String, String)>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,
}

/// What gets printed for a resolved package.
#[derive(Serialize)]
struct SettingsReport<'a> {
    package: &'a str,
    config_source: String,
    build_type: &'a str,
    python_source: Option<&'a str>,
    always_run_doxygen: bool,
    always_run_sphinx_apidoc: bool,
    tool_options: &'a ToolOptions,
    settings: &'a SettingsSection,
    builders: &'a [BuilderSettings],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let out_colors = Colors::new(should_use_colors(cli.no_color, &std::io::stdout()));
    let err_colors = Colors::new(should_use_colors(cli.no_color, &std::io::stderr()));

    match run(&cli, &out_colors) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            // `{:#}` prints the whole cause chain on one line
            eprintln!("{}: {report:#}", err_colors.paint(err_colors.error, "Error"));
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli, colors: &Colors) -> Result<()> {
    let package_xml = find_package_xml(&cli.package)?;
    let package = PackageManifest::from_path(&package_xml)?;

    if cli.init {
        return handle_init(&package, colors);
    }

    if cli.print_config {
        let resolved = resolve_config_text(&package)?;
        print!("{}", resolved.text);
        return Ok(());
    }

    let tool_options: ToolOptions = cli.options.iter().cloned().collect();
    let inspected = inspect_package_for_settings(&package, tool_options)?;
    let ctx = &inspected.context;

    let report = SettingsReport {
        package: package.name(),
        config_source: ctx.configuration_file_path(),
        build_type: ctx.build_type(),
        python_source: ctx.python_source(),
        always_run_doxygen: ctx.always_run_doxygen(),
        always_run_sphinx_apidoc: ctx.always_run_sphinx_apidoc(),
        tool_options: ctx.tool_options(),
        settings: &inspected.settings,
        builders: &inspected.builders,
    };

    let yaml = serde_yaml::to_string(&report).wrap_err("failed to serialize settings report")?;
    print!("{yaml}");
    Ok(())
}

fn handle_init(package: &PackageManifest, colors: &Colors) -> Result<()> {
    let dir = package.filename().parent().unwrap_or_else(|| Path::new("."));

    let path = generate_default_config_file_in(dir, package)?;
    println!(
        "{} {}",
        colors.paint(colors.success, "Created"),
        colors.paint(colors.path, path.display())
    );
    println!(
        "Add <rosdoc2>{}</rosdoc2> to the <export> section of package.xml to use it.",
        rosdoc2_settings::DEFAULT_CONFIG_FILE_NAME
    );
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "rosdoc2_settings=warn",
        1 => "rosdoc2_settings=info",
        2 => "rosdoc2_settings=debug",
        _ => "rosdoc2_settings=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
