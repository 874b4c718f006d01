//! Doctor command - verify configuration and backend reachability.

use crate::backend::{Backend, HttpBackend};
use crate::cli::{preflight, Output};
use crate::config::Settings;
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

/// Run all diagnostic checks against the settings loaded from `config_path`.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Ragdesk Doctor");
    println!();
    println!("Checking configuration and backend...\n");

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    checks.push(check_config_file(config_path));
    checks.push(check_extensions(settings));
    let url_check = check_server_url(settings);
    let url_ok = url_check.status == CheckStatus::Ok;
    checks.push(url_check);
    for check in &checks {
        check.print();
    }
    println!();

    println!("{}", style("Backend").bold());
    let backend_check = if url_ok {
        match HttpBackend::from_settings(settings) {
            Ok(backend) => check_health(&backend).await,
            Err(e) => CheckResult::error("Health", &e.to_string(), "Fix server.base_url"),
        }
    } else {
        CheckResult::warning("Health", "skipped", "Fix server.base_url first")
    };
    backend_check.print();
    checks.push(backend_check);
    println!();

    let errors = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Error)
        .count();
    let warnings = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Warning)
        .count();

    if errors > 0 {
        Output::error(&format!("{} error(s), {} warning(s)", errors, warnings));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All required checks passed, {} warning(s)", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "not found, using defaults",
            &format!("Create {} to customize settings", path.display()),
        )
    }
}

fn check_extensions(settings: &Settings) -> CheckResult {
    match preflight::check_extensions(settings) {
        Ok(()) => CheckResult::ok(
            "File types",
            &settings.ingest.accepted_extensions.join(", "),
        ),
        Err(e) => CheckResult::error(
            "File types",
            &e.to_string(),
            "Set ingest.accepted_extensions, e.g. [\"pdf\", \"txt\"]",
        ),
    }
}

fn check_server_url(settings: &Settings) -> CheckResult {
    match settings.base_url() {
        Ok(url) => CheckResult::ok("Server URL", url.as_str()),
        Err(e) => CheckResult::error(
            "Server URL",
            &e.to_string(),
            "Set server.base_url or pass --server http://host:port",
        ),
    }
}

async fn check_health(backend: &dyn Backend) -> CheckResult {
    match backend.health().await {
        Ok(status) if status.is_ok() => CheckResult::ok("Health", "backend is up"),
        Ok(status) => CheckResult::warning(
            "Health",
            &format!("backend reports status '{}'", status.status),
            "Check the backend logs",
        ),
        Err(e) if e.is_transport() => CheckResult::error(
            "Health",
            "no response from server",
            "Make sure the backend is running",
        ),
        Err(e) => CheckResult::error("Health", &e.to_string(), "Check the backend logs"),
    }
}
