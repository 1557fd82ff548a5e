use std::path::PathBuf;

use clap::Parser;

/// Command-line flags.
///
/// `-v` prints the version and exits *before* the config file is read or
/// parsed — callers must check `Cli::version` before calling `Settings::load`.
#[derive(Debug, Parser)]
#[command(name = "proxyctl", about = "Service-discovery-driven reverse-proxy config controller")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short = 'f', long = "config", default_value = "nixy.toml")]
    pub config: PathBuf,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_nixy_toml() {
        let cli = Cli::parse_from(["proxyctl"]);
        assert_eq!(cli.config, PathBuf::from("nixy.toml"));
        assert!(!cli.version);
    }

    #[test]
    fn accepts_custom_config_path() {
        let cli = Cli::parse_from(["proxyctl", "-f", "/etc/proxyctl/custom.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/proxyctl/custom.toml"));
    }

    #[test]
    fn recognizes_version_flag() {
        let cli = Cli::parse_from(["proxyctl", "-v"]);
        assert!(cli.version);
    }
}
