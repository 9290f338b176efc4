use crate::config::DEFAULT_CONFIG_PATH;
use crate::models::Action;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Version string baked in at build time via `BUILD_VERSION`.
pub const BUILD_VERSION: &str = match option_env!("BUILD_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Parser, Debug)]
#[command(
    name = "robovac-trigger",
    about = "Start or stop an outdoor robot vacuum based on precipitation in InfluxDB",
    disable_version_flag = true
)]
pub struct Cli {
    /// Set the location for the YAML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// start decides whether to start the vacuum, stop whether to stop it based on the forecast
    #[arg(short, long, value_enum, default_value_t = Action::Start)]
    pub action: Action,

    /// Print the version and exit
    #[arg(long)]
    pub version: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

const LONG_FLAGS: [&str; 3] = ["config", "action", "version"];

/// Rewrite Go-style single-dash long flags (`-config x`, `-action=stop`)
/// into the double-dash form clap expects.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if s == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let rewritten = s
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .filter(|rest| {
                let name = rest.split_once('=').map_or(*rest, |(name, _)| name);
                LONG_FLAGS.contains(&name)
            })
            .map(|rest| OsString::from(format!("--{}", rest)));

        out.push(rewritten.unwrap_or(arg));
    }

    out
}
