//! Command execution: settings, streams, compile, diagnostics

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, info, instrument};

use crate::application::Compiler;
use crate::cli::args::Cli;
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::Settings;
use crate::infrastructure::{open_input, open_output, write_output, InfraError};

/// Execute the CLI invocation.
#[instrument(level = "debug", skip_all)]
pub fn execute(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }
    if cli.config_template {
        output::info(&Settings::template());
        return Ok(());
    }

    let cwd = std::env::current_dir().map_err(|e| InfraError::io("get current directory", e))?;
    let settings = apply_flags(Settings::load(Some(cwd.as_path()))?, cli);
    debug!(?settings, "effective settings");

    if cli.show_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let reader = open_input(cli.input.as_deref())?;
    let compilation = Compiler::new(settings.compile_options())
        .compile_reporting(reader, |warning| output::warning(warning))?;

    let mut sink = open_output(cli.output.as_deref())?;
    write_output(sink.as_mut(), &compilation.output)?;
    info!(bytes = compilation.output.len(), "output written");
    Ok(())
}

/// Command-line flags take precedence over every settings layer.
pub fn apply_flags(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(format) = cli.format() {
        settings.format = format;
    }
    if let Some(layout) = cli.layout {
        settings.layout = layout.into();
    }
    if cli.wants_warnings() {
        settings.verbose = true;
    }
    settings
}
