use crate::CheckResult;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonTypo {
    row: usize,
    col: usize,
    code: u8,
    word: String,
    suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonFile {
    file: String,
    typos: Vec<JsonTypo>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_errors: usize,
    files: Vec<JsonFile>,
}

pub fn print_results(
    results: &[CheckResult],
    colored_output: bool,
    only_errors: bool,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Text => {
            for result in results {
                print_text_result(result, colored_output, only_errors);
            }
        }
        OutputFormat::Json => print_json_results(results, only_errors),
    }
}

fn print_text_result(result: &CheckResult, colored_output: bool, only_errors: bool) {
    let file_name = result.path.display().to_string();

    if result.typos.is_empty() {
        if !only_errors {
            if colored_output {
                println!("{} {}", "✓".green().bold(), file_name);
            } else {
                println!("✓ {}", file_name);
            }
        }
        return;
    }

    if colored_output {
        println!("{} {}", "✗".red().bold(), file_name.bold().underline());
    } else {
        println!("✗ {}", file_name);
    }

    for typo in &result.typos {
        let line_info = format!("{}:{}", typo.row + 1, typo.col + 1);
        let suggestions = typo.suggestions.join(", ");

        if colored_output {
            print!(
                "  {} {} {}",
                line_info.blue().bold(),
                typo.word.red().bold(),
                format!("({})", typo.code).dimmed()
            );
            if !suggestions.is_empty() {
                print!(" {} {}", "→".dimmed(), suggestions.green());
            }
        } else {
            print!("  {} {} ({})", line_info, typo.word, typo.code);
            if !suggestions.is_empty() {
                print!(" → {}", suggestions);
            }
        }
        println!();
    }
}

fn print_json_results(results: &[CheckResult], only_errors: bool) {
    let files: Vec<JsonFile> = results
        .iter()
        .filter(|r| !only_errors || !r.typos.is_empty())
        .map(|r| JsonFile {
            file: r.path.display().to_string(),
            typos: r
                .typos
                .iter()
                .map(|t| JsonTypo {
                    row: t.row,
                    col: t.col,
                    code: t.code.into(),
                    word: t.word.clone(),
                    suggestions: t.suggestions.clone(),
                })
                .collect(),
        })
        .collect();

    let output = JsonOutput {
        files_checked: results.len(),
        total_errors: results.iter().map(CheckResult::error_count).sum(),
        files,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("Failed to serialize report: {}", e),
    }
}

pub fn print_check_summary(total_errors: usize, files_checked: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No typos found!".green().bold());
        } else {
            println!("✓ No typos found!");
        }
    } else {
        let error_word = if total_errors == 1 { "typo" } else { "typos" };
        let file_word = if files_checked == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files_checked,
                file_word
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors, error_word, files_checked, file_word
            );
        }
    }
}
