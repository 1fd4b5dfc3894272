//! Command-line flags shared by `hkm-chat` and `hkm-chat-server`.
//!
//! Hand-parsed: the surface is three flags and does not justify a parser
//! dependency.

/// Parsed arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `-f/--config`; `None` means `config/default.toml`.
    pub config_path: Option<String>,
    /// Level implied by `-v` flags; takes precedence over config and `RUST_LOG`.
    pub log_level: Option<&'static str>,
    /// `--console`: force the line-oriented front-end even on a terminal.
    pub console: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(CliArgs),
    Help,
}

pub fn usage(bin: &str) -> String {
    format!(
        "Usage: {bin} [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -h, --help                 Print help\n\
         \x20 -f, --config <PATH>        Path to configuration file (default: config/default.toml)\n\
         \x20     --console              Line-oriented console instead of the terminal UI\n\
         \x20 -v, -vv, -vvv, -vvvv       Increase logging verbosity\n"
    )
}

/// Parse everything after the program name.
pub fn parse<I>(args: I) -> Result<CliAction, String>
where
    I: IntoIterator<Item = String>,
{
    let mut verbosity = 0u8;
    let mut parsed = CliArgs::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "--console" => parsed.console = true,
            "-f" | "--config" => match iter.next() {
                Some(path) => parsed.config_path = Some(path),
                None => return Err("-f/--config requires a path argument".to_string()),
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add(u8::try_from(a.len() - 1).unwrap_or(u8::MAX));
            }
            other => return Err(format!("unrecognised argument: {other}")),
        }
    }

    // Each -v raises verbosity one tier:
    //   -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    parsed.log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    Ok(CliAction::Run(parsed))
}
