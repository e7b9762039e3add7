//! Speisekarte CLI: raw OCR text lines in, structured menu draft out.
//!
//! Reads one menu line per input line from a file or stdin, runs the
//! semantic pipeline, and writes the draft as JSON. The full audit trail
//! (grammar, flags, confidence details, repair recommendations) is part of
//! the output contract; nothing is dropped for brevity.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use speisekarte::{run_pipeline_on_text, PipelineConfig, PipelineOutput};

#[derive(Parser, Debug)]
#[command(
    name = "speisekarte",
    version,
    about = "Turn noisy OCR menu text into structured, confidence-scored menu items"
)]
struct Cli {
    /// Input file with one OCR line per text line; reads stdin when omitted.
    input: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Execute auto-fixable repair recommendations before output.
    #[arg(long)]
    apply_repairs: bool,

    /// Emit only the menu-level quality report instead of the full draft.
    #[arg(long)]
    summary: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_lines(input: Option<&PathBuf>) -> anyhow::Result<Vec<String>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    Ok(text.lines().map(str::to_string).collect())
}

fn render(output: &PipelineOutput, summary: bool, pretty: bool) -> anyhow::Result<String> {
    let value = if summary {
        serde_json::to_value(&output.report)?
    } else {
        serde_json::json!({
            "items": output.items,
            "lines": output.lines,
            "report": output.report,
        })
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.apply_repairs {
        config.apply_auto_repairs = true;
    }

    let lines = read_lines(cli.input.as_ref())?;
    tracing::debug!(lines = lines.len(), "running pipeline");
    let output = run_pipeline_on_text(&lines, &config);

    let rendered = render(&output, cli.summary, cli.pretty)?;
    match &cli.output {
        Some(path) => std::fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write output: {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_draft() {
        let output = run_pipeline_on_text(
            &["SPECIALTY PIZZAS", "Margherita 12.99"],
            &PipelineConfig::default(),
        );
        let rendered = render(&output, false, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["items"].is_array());
        assert!(value["lines"].is_array());
        assert_eq!(value["items"][0]["name"], "Margherita");
        assert_eq!(value["items"][0]["variants"][0]["price_cents"], 1299);
    }

    #[test]
    fn test_render_summary_only() {
        let output = run_pipeline_on_text(&["Margherita 12.99"], &PipelineConfig::default());
        let rendered = render(&output, true, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["menu_confidence"]["quality_grade"].is_string());
        assert!(value.get("items").is_none());
    }

    #[test]
    fn test_read_lines_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.txt");
        std::fs::write(&path, "PIZZA\nMargherita 12.99\n").unwrap();
        let lines = read_lines(Some(&path)).unwrap();
        assert_eq!(lines, vec!["PIZZA".to_string(), "Margherita 12.99".to_string()]);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["speisekarte", "menu.txt", "--summary", "--pretty", "--apply-repairs"]);
        assert!(cli.summary);
        assert!(cli.pretty);
        assert!(cli.apply_repairs);
        assert_eq!(cli.input.as_deref().unwrap().to_str(), Some("menu.txt"));
    }
}
