//! pdf2html CLI - Command-line client for the pdf2html conversion service

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pdf2html_core::domain::upload::{output_filename_for, validate_filename};
use pdf2html_core::domain::UPLOAD_FIELD;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Parser)]
#[command(name = "pdf2html")]
#[command(about = "pdf2html conversion service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL
    #[arg(long, env = "PDF2HTML_URL", default_value = DEFAULT_SERVER_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is up
    Health,

    /// Convert a PDF to HTML
    Convert {
        /// PDF file to upload
        file: PathBuf,

        /// Keep the converter's HTML as-is (no sanitizing)
        #[arg(long)]
        full: bool,

        /// Print the JSON response instead of writing an HTML file
        #[arg(long)]
        json: bool,

        /// Output path (default: <name>.html in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

#[derive(Tabled)]
struct ConvertSummary {
    input: String,
    output: String,
    mode: &'static str,
    bytes: usize,
}

/// Endpoint for a conversion request
fn convert_endpoint(base: &str, full: bool, json: bool) -> String {
    let path = match (json, full) {
        (false, false) => "/convert",
        (false, true) => "/convert/full",
        (true, false) => "/convert/text",
        (true, true) => "/convert/text/full",
    };
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Turn a non-2xx response body into a readable message
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("Server error ({}): {}\n{}", status, error, details.trim_end()),
        Ok(ErrorBody { error, .. }) => format!("Server error ({}): {}", status, error),
        Err(_) => format!("Server error ({}): {}", status, body.trim()),
    }
}

fn display_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .with_context(|| format!("Not a file name: {}", path.display()))
}

async fn health(client: &reqwest::Client, url: &str) -> Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    let response = client
        .get(&endpoint)
        .send()
        .await
        .context("Failed to connect to server")?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse response")?;

    if status.is_success() && body.get("status").and_then(|s| s.as_str()) == Some("ok") {
        println!("{}", format!("✓ Server at {} is healthy", url).green().bold());
        Ok(())
    } else {
        anyhow::bail!("Server at {} is unhealthy ({}): {}", url, status, body)
    }
}

async fn convert(
    client: &reqwest::Client,
    url: &str,
    file: &Path,
    full: bool,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let filename = display_name(file)?;
    validate_filename(&filename).map_err(|e| anyhow::anyhow!("{}: {}", file.display(), e))?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let size = bytes.len();

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename.clone())
        .mime_str("application/pdf")?;
    let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

    println!(
        "{}",
        format!("Uploading {} ({} bytes)...", filename, size).cyan()
    );

    let response = client
        .post(convert_endpoint(url, full, json))
        .multipart(form)
        .send()
        .await
        .context("Failed to connect to server")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read response")?;

    if !status.is_success() {
        anyhow::bail!(describe_error(status, &body));
    }

    if json {
        match output {
            Some(path) => tokio::fs::write(&path, &body)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => println!("{}", body),
        }
        return Ok(());
    }

    let output = output.unwrap_or_else(|| PathBuf::from(output_filename_for(&filename)));
    tokio::fs::write(&output, &body)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", "✓ Conversion complete".green().bold());
    println!();

    let summary = ConvertSummary {
        input: file.display().to_string(),
        output: output.display().to_string(),
        mode: if full { "full" } else { "clean" },
        bytes: body.len(),
    };
    println!("{}", Table::new(vec![summary]));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => health(&client, &cli.url).await?,

        Commands::Convert {
            file,
            full,
            json,
            output,
        } => convert(&client, &cli.url, &file, full, json, output).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_endpoint() {
        assert_eq!(
            convert_endpoint("http://localhost:5000/", false, false),
            "http://localhost:5000/convert"
        );
        assert_eq!(
            convert_endpoint("http://localhost:5000", true, false),
            "http://localhost:5000/convert/full"
        );
        assert_eq!(
            convert_endpoint("http://localhost:5000", false, true),
            "http://localhost:5000/convert/text"
        );
        assert_eq!(
            convert_endpoint("http://localhost:5000", true, true),
            "http://localhost:5000/convert/text/full"
        );
    }

    #[test]
    fn test_describe_error() {
        let status = reqwest::StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(
            describe_error(
                status,
                r#"{"error":"Conversion failed","details":"Error: bad xref\n"}"#
            ),
            "Server error (500 Internal Server Error): Conversion failed\nError: bad xref"
        );

        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            describe_error(status, r#"{"error":"File must be a PDF"}"#),
            "Server error (400 Bad Request): File must be a PDF"
        );
        assert_eq!(
            describe_error(status, "not json"),
            "Server error (400 Bad Request): not json"
        );
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "pdf2html",
            "--url",
            "http://svc:5000",
            "convert",
            "report.pdf",
            "--full",
            "-o",
            "out.html",
        ])
        .unwrap();

        assert_eq!(cli.url, "http://svc:5000");
        match cli.command {
            Commands::Convert {
                file,
                full,
                json,
                output,
            } => {
                assert_eq!(file, PathBuf::from("report.pdf"));
                assert!(full);
                assert!(!json);
                assert_eq!(output, Some(PathBuf::from("out.html")));
            }
            Commands::Health => panic!("expected convert"),
        }
    }
}
