// src/cli.rs
// =============================================================================
// Command-line configuration for the service, parsed with the `clap` crate.
// =============================================================================

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "link-sentry",
    version,
    about = "A web service that checks batches of links and serves status reports"
)]
pub struct Cli {
    /// Address to bind the HTTP server on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Directory holding the ledger and deferred task files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 3)]
    pub probe_timeout: u64,

    /// How many probes of one batch may be in flight at once
    #[arg(long, default_value_t = 64)]
    pub probe_concurrency: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let cli = Cli::parse_from(["link-sentry"]);
        assert_eq!(cli.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.probe_timeout, 3);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "link-sentry",
            "--bind",
            "127.0.0.1:9090",
            "--data-dir",
            "/tmp/sentry",
            "--probe-timeout",
            "10",
            "--probe-concurrency",
            "16",
        ]);
        assert_eq!(cli.bind, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/sentry"));
        assert_eq!(cli.probe_timeout, 10);
        assert_eq!(cli.probe_concurrency, 16);
    }
}
