//! Doctor command - verify API keys, knowledge document and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::DocumentKind;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Toolchat Doctor");
    println!();
    println!("Checking API keys and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    let key_checks = vec![
        check_key(
            "DEEPSEEK_API_KEY",
            settings.model_api_key(),
            true,
            "Set with: export DEEPSEEK_API_KEY='sk-...' (required for chat)",
        ),
        check_key(
            "OPENWEATHER_API_KEY",
            settings.weather_api_key(),
            false,
            "Set with: export OPENWEATHER_API_KEY='...' (weather tool only)",
        ),
        check_key(
            "EMBEDDING_API_KEY",
            settings.embedding_api_key(),
            false,
            "Set EMBEDDING_API_KEY or OPENAI_API_KEY (knowledge base only)",
        ),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Knowledge Base").bold());
    let doc_check = check_document(&settings.document_path());
    doc_check.print();
    checks.push(doc_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Toolchat.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Toolchat is ready to use.");
    }

    Ok(())
}

/// Check an API key, showing only a masked form.
fn check_key(name: &str, key: Option<&str>, required: bool, hint: &str) -> CheckResult {
    match key {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_key(key))),
        None if required => CheckResult::error(name, "not set", hint),
        None => CheckResult::warning(name, "not set", hint),
    }
}

/// Check the knowledge document.
fn check_document(path: &Path) -> CheckResult {
    let name = "Document";
    if !path.exists() {
        return CheckResult::warning(
            name,
            &format!("{} (not found)", path.display()),
            "Set knowledge.document_path in the config file",
        );
    }

    match DocumentKind::detect(path) {
        Some(_) => {
            let size = std::fs::metadata(path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok(name, &format!("{} ({})", path.display(), size))
        }
        None => CheckResult::warning(
            name,
            &format!("{} (unsupported type)", path.display()),
            "Use a .pdf, .txt or .md document",
        ),
    }
}

/// Check if the config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: toolchat config edit",
        )
    }
}

/// Keep the first and last few characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
