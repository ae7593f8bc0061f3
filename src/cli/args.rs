use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use tfdrift::Severity;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the terraform.tfstate file
    pub statefile: PathBuf,

    /// Base URL of the provider describe API
    #[arg(long, env = "TFDRIFT_ENDPOINT")]
    pub endpoint: String,

    /// API token for the provider describe API
    #[arg(long, env = "TFDRIFT_API_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Maximum concurrent inspections
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Overall scan deadline in seconds; resources not checked in time
    /// are reported as unknown rather than skipped
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Exit nonzero when any resource reaches this severity
    #[arg(long, value_enum, default_value_t = FailOn::Low)]
    pub fail_on: FailOn,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write remediation suggestions to this file
    #[arg(long)]
    pub fix_out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Low,
    Medium,
    High,
    Critical,
}

impl From<FailOn> for Severity {
    fn from(value: FailOn) -> Self {
        match value {
            FailOn::Low => Severity::Low,
            FailOn::Medium => Severity::Medium,
            FailOn::High => Severity::High,
            FailOn::Critical => Severity::Critical,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    const BASE: [&str; 6] = [
        "tfdrift",
        "terraform.tfstate",
        "--endpoint=http://gateway.local",
        "--token=test_token",
        "--format=table",
        "--fail-on=low",
    ];

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::parse_from([
            "tfdrift",
            "terraform.tfstate",
            "--endpoint=http://gateway.local",
            "--token=test_token",
        ]);
        assert_eq!(cli.statefile, PathBuf::from("terraform.tfstate"));
        assert_eq!(cli.endpoint, "http://gateway.local");
        assert_eq!(cli.concurrency, 8);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.fail_on, FailOn::Low);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_fail_on_threshold_parsing() {
        let mut args = BASE.to_vec();
        args[5] = "--fail-on=high";
        let cli = Cli::parse_from(args);
        assert_eq!(cli.fail_on, FailOn::High);
        assert_eq!(Severity::from(cli.fail_on), Severity::High);
    }

    #[test]
    fn test_json_format_and_fix_out() {
        let mut args = BASE.to_vec();
        args[4] = "--format=json";
        args.push("--fix-out=fixes.tf");
        let cli = Cli::parse_from(args);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.fix_out, Some(PathBuf::from("fixes.tf")));
    }

    #[test]
    fn test_concurrency_and_timeout_flags() {
        let mut args = BASE.to_vec();
        args.push("--concurrency=2");
        args.push("--timeout=30");
        let cli = Cli::parse_from(args);
        assert_eq!(cli.concurrency, 2);
        assert_eq!(cli.timeout, Some(30));
    }

    #[test]
    #[serial]
    fn test_token_from_env_var_fallback() {
        let token_backup = std::env::var("TFDRIFT_API_TOKEN").ok();
        unsafe {
            std::env::set_var("TFDRIFT_API_TOKEN", "env_token");
        }

        let cli = Cli::parse_from([
            "tfdrift",
            "terraform.tfstate",
            "--endpoint=http://gateway.local",
        ]);

        unsafe {
            match token_backup {
                Some(token) => std::env::set_var("TFDRIFT_API_TOKEN", token),
                None => std::env::remove_var("TFDRIFT_API_TOKEN"),
            }
        }

        assert_eq!(cli.token, "env_token");
    }

    #[test]
    #[serial]
    fn test_cli_flag_takes_precedence_over_env() {
        let token_backup = std::env::var("TFDRIFT_API_TOKEN").ok();
        unsafe {
            std::env::set_var("TFDRIFT_API_TOKEN", "env_token");
        }

        let cli = Cli::parse_from([
            "tfdrift",
            "terraform.tfstate",
            "--endpoint=http://gateway.local",
            "--token=cli_token",
        ]);

        unsafe {
            match token_backup {
                Some(token) => std::env::set_var("TFDRIFT_API_TOKEN", token),
                None => std::env::remove_var("TFDRIFT_API_TOKEN"),
            }
        }

        assert_eq!(cli.token, "cli_token");
    }

    #[test]
    #[serial]
    fn test_endpoint_from_env_var_fallback() {
        let endpoint_backup = std::env::var("TFDRIFT_ENDPOINT").ok();
        unsafe {
            std::env::set_var("TFDRIFT_ENDPOINT", "http://env-gateway.local");
        }

        let cli = Cli::parse_from(["tfdrift", "terraform.tfstate", "--token=test_token"]);

        unsafe {
            match endpoint_backup {
                Some(endpoint) => std::env::set_var("TFDRIFT_ENDPOINT", endpoint),
                None => std::env::remove_var("TFDRIFT_ENDPOINT"),
            }
        }

        assert_eq!(cli.endpoint, "http://env-gateway.local");
    }
}
