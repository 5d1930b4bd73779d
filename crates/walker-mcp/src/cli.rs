//! Command line handling for the walker-mcp binary.

use std::path::PathBuf;

use walker_mcp_core::{Error, Result};

/// Usage text printed for `--help`.
pub const USAGE: &str = "\
Usage: walker-mcp [OPTIONS]

Serves the walker MCP tools over stdin/stdout.

Options:
  --config <PATH>  Load server settings from a YAML file
  --list-tools     Print the tool catalog as JSON and exit
  -h, --help       Print this help and exit
  -V, --version    Print the version and exit";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve on stdio (or print the catalog with `list_tools`)
    Run(RunOptions),
    /// Print usage
    Help,
    /// Print version
    Version,
}

/// Options for [`Command::Run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// YAML config file
    pub config: Option<PathBuf>,
    /// Print the tool catalog instead of serving
    pub list_tools: bool,
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = RunOptions::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Self::Help),
                "-V" | "--version" => return Ok(Self::Version),
                "--list-tools" => options.list_tools = true,
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| Error::Config("--config requires a path".to_string()))?;
                    options.config = Some(PathBuf::from(path));
                }
                other => match other.strip_prefix("--config=") {
                    Some(path) => options.config = Some(PathBuf::from(path)),
                    None => {
                        return Err(Error::Config(format!("unknown argument '{other}'")));
                    }
                },
            }
        }

        Ok(Self::Run(options))
    }
}
