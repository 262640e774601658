use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ostrails_protocol::{ProxyClient, SubmissionResult};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ostrails", version, about = "Send records through a running OSTrails proxy")]
struct Args {
    /// Proxy base URL including the `/questionnaire` prefix
    #[arg(long, env = "OSTRAILS_PROXY_URL", default_value = "http://localhost:8000/questionnaire")]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the proxy is up
    Health,
    /// Submit a FAIRsharing JSON record
    Submit { file: PathBuf },
    /// Commit a Turtle record to GitHub and register it with the FDP
    Push {
        file: PathBuf,
        /// Repository path overriding the one derived from the record
        #[arg(long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = ProxyClient::with_timeout(&args.url, Duration::from_secs(args.timeout))?;
    debug!("Using proxy at {}", client.base_url());

    let all_ok = match args.command {
        Command::Health => {
            let health = client.health().await?;
            print_json(&serde_json::to_value(&health)?)?;
            true
        }
        Command::Submit { file } => {
            let text = read_file(&file)?;
            let record: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let result = client.submit(&record).await?;
            print_json(&serde_json::to_value(&result)?)?;
            all_succeeded(std::slice::from_ref(&result))
        }
        Command::Push { file, path } => {
            let turtle = read_file(&file)?;
            let response = client.push(turtle, path.as_deref()).await?;
            print_json(&serde_json::to_value(&response)?)?;
            all_succeeded(&response.results)
        }
    };

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    info!("Reading {}", path.display());
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn all_succeeded(results: &[SubmissionResult]) -> bool {
    results.iter().all(|r| r.success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostrails_protocol::TargetName;

    #[test]
    fn test_parse_push_args() {
        let args = Args::try_parse_from([
            "ostrails",
            "--url",
            "http://proxy:8000/questionnaire",
            "push",
            "record.ttl",
            "--path",
            "metrics/FM_F1A.ttl",
        ])
        .unwrap();
        assert_eq!(args.url, "http://proxy:8000/questionnaire");
        match args.command {
            Command::Push { file, path } => {
                assert_eq!(file, PathBuf::from("record.ttl"));
                assert_eq!(path.as_deref(), Some("metrics/FM_F1A.ttl"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_any_failed_target_fails_run() {
        let ok = SubmissionResult::succeeded(TargetName::Github, 201, serde_json::json!({}));
        let failed = SubmissionResult::failed(TargetName::Fdp, None, "RegistrationError: down");
        assert!(all_succeeded(&[ok.clone()]));
        assert!(!all_succeeded(&[ok, failed]));
    }
}
