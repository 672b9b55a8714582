//! CLI argument parsing module for depush

use crate::config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Ref used when neither the command line nor the configuration names one
pub const DEFAULT_REF: &str = "master";

/// Parse duration string in format: Ns (seconds), Nm (minutes), Nh (hours)
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;
    if num == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(Duration::from_secs(num * multiplier))
}

/// Parse a positive number of concurrent targets
fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid concurrency: {}", s)),
    }
}

/// Propagate dependency versions into downstream repositories
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depush",
    version,
    about = "Push the versions a repository publishes into the repositories that depend on it"
)]
pub struct CliArgs {
    /// Clone URL of the repository whose versions are pushed
    pub clone_url: Option<String>,

    /// Ref of the source the versions are taken at (default: master)
    #[arg(short = 'r', long = "ref")]
    pub git_ref: Option<String>,

    /// Working copy of the source; its remote is used as the clone URL
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Configuration file listing the known repositories
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    // General options
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Run options
    /// Number of target repositories processed at once (overrides the configuration)
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Upper bound for publishing one target (e.g., 30s, 5m, 1h)
    #[arg(long, value_parser = parse_duration)]
    pub publish_timeout: Option<Duration>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// Returns the ref to push from, falling back to the configured default
    pub fn git_ref_or(&self, configured: Option<&str>) -> String {
        self.git_ref
            .as_deref()
            .or(configured)
            .unwrap_or(DEFAULT_REF)
            .to_string()
    }

    /// Returns true if the progress bar should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args)
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("xs").is_err());
        assert!(parse_duration("0s").is_err());
    }

    #[test]
    fn test_parse_concurrency() {
        assert_eq!(parse_concurrency("8").unwrap(), 8);
        assert!(parse_concurrency("0").is_err());
        assert!(parse_concurrency("many").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["depush"]);
        assert!(args.clone_url.is_none());
        assert!(args.dir.is_none());
        assert_eq!(args.config, PathBuf::from("depush.toml"));
        assert!(!args.dry_run);
        assert!(!args.json);
        assert!(args.concurrency.is_none());
        assert_eq!(args.git_ref_or(None), "master");
        assert!(args.show_progress());
    }

    #[test]
    fn test_clone_url_and_ref() {
        let args = parse(&["depush", "git@github.com:acme/foo.git", "-r", "v2"]);
        assert_eq!(args.clone_url.as_deref(), Some("git@github.com:acme/foo.git"));
        assert_eq!(args.git_ref_or(Some("main")), "v2");

        let args = parse(&["depush", "https://github.com/acme/foo"]);
        assert_eq!(args.git_ref_or(Some("main")), "main");
    }

    #[test]
    fn test_dir_and_config() {
        let args = parse(&["depush", "--dir", "../foo", "-c", "/etc/depush.toml"]);
        assert_eq!(args.dir, Some(PathBuf::from("../foo")));
        assert_eq!(args.config, PathBuf::from("/etc/depush.toml"));
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "depush",
            "-n",
            "--json",
            "--log-json",
            "--verbose",
            "--concurrency",
            "2",
            "--publish-timeout",
            "90s",
        ]);
        assert!(args.dry_run);
        assert!(args.json);
        assert!(args.log_json);
        assert!(args.verbose);
        assert_eq!(args.concurrency, Some(2));
        assert_eq!(args.publish_timeout, Some(Duration::from_secs(90)));
        assert!(!args.show_progress());
    }

    #[test]
    fn test_quiet_disables_progress() {
        let args = parse(&["depush", "-q"]);
        assert!(args.quiet);
        assert!(!args.show_progress());
    }

    #[test]
    fn test_invalid_concurrency_rejected() {
        assert!(CliArgs::try_parse_from(["depush", "--concurrency", "0"]).is_err());
    }
}
