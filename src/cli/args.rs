// src/cli/args.rs
// Argument parsing for the ricochet binary. The CLI itself is an external
// collaborator per 6 - only its exit-code contract (0/1/2/130) and
// subcommand shapes are normative here.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ricochet")]
#[command(author)]
#[command(version)]
#[command(about = "Second-order (out-of-band) vulnerability correlation engine", long_about = None)]
pub struct CliArgs {
    /// Path to the SQLite store. Defaults to the per-user config directory.
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP and DNS callback servers until interrupted.
    Serve(ServeArgs),
    /// Inject a payload template into a target request.
    Inject(InjectArgs),
    /// List findings, optionally filtered by recency and severity.
    Findings(FindingsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Only run the HTTP callback server.
    #[arg(long)]
    pub http_only: bool,
    /// Only run the DNS callback server.
    #[arg(long)]
    pub dns_only: bool,
}

#[derive(Args, Debug)]
pub struct InjectArgs {
    /// Target URL to inject against.
    #[arg(long)]
    pub url: String,
    /// Payload template; may contain a `{{CALLBACK}}`-style placeholder.
    #[arg(long)]
    pub payload: String,
    /// Vulnerability class tag used for severity derivation, e.g. `sqli:mssql`.
    #[arg(long)]
    pub context: Option<String>,
    /// Record the injection without sending the request.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct FindingsArgs {
    /// Only findings received after this many seconds since the epoch.
    #[arg(long)]
    pub since: Option<f64>,
    /// Minimum severity: info, low, medium, high.
    #[arg(long)]
    pub min_severity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_subcommand() {
        let args = CliArgs::parse_from(["ricochet", "serve"]);
        assert!(matches!(args.command, Command::Serve(_)));
    }

    #[test]
    fn parses_inject_subcommand() {
        let args = CliArgs::parse_from([
            "ricochet",
            "inject",
            "--url",
            "http://t.example/search?q=x",
            "--payload",
            "{{CALLBACK}}",
        ]);
        match args.command {
            Command::Inject(inject) => {
                assert_eq!(inject.url, "http://t.example/search?q=x");
                assert!(!inject.dry_run);
            }
            _ => panic!("expected Inject"),
        }
    }

    #[test]
    fn parses_findings_subcommand_with_filters() {
        let args = CliArgs::parse_from(["ricochet", "findings", "--min-severity", "high"]);
        match args.command {
            Command::Findings(findings) => {
                assert_eq!(findings.min_severity.as_deref(), Some("high"));
            }
            _ => panic!("expected Findings"),
        }
    }
}
