//! Output formatting for the preflight report

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::preflight::{PathCheck, PreflightReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_preflight(&self, report: &PreflightReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize preflight report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize preflight report to YAML"),
            OutputFormat::Human => Ok(self.format_preflight_human(report)),
        }
    }

    fn format_preflight_human(&self, report: &PreflightReport) -> String {
        let mut out = String::new();
        let mark = |ok: bool| if ok { "✓" } else { "✗" };
        let path_line = |out: &mut String, label: &str, check: &PathCheck| {
            let _ = writeln!(
                out,
                "  {} {:<14} {}",
                mark(check.present),
                label,
                check.path.display()
            );
        };

        let _ = writeln!(out, "PlotTwist preflight");
        let _ = writeln!(out);

        let _ = writeln!(out, "Dependencies ({}):", report.python);
        if report.bootstrap_skipped {
            let _ = writeln!(out, "  - bootstrap skipped");
        }
        for package in &report.packages {
            let line = match (package.installed, &package.error) {
                (_, Some(error)) => format!("  ✗ {} ({})", package.name, error),
                (Some(true), _) => format!("  ✓ {}", package.name),
                (Some(false), _) => format!("  - {} (will be installed)", package.name),
                (None, None) => format!("  - {}", package.name),
            };
            let _ = writeln!(out, "{}", line);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Files:");
        path_line(&mut out, "env file", &report.env_file);
        path_line(&mut out, "frontend", &report.frontend_dir);
        path_line(&mut out, "marker", &report.source_marker);
        path_line(&mut out, "backend", &report.backend_entry);

        let _ = writeln!(out);
        let _ = writeln!(out, "Keys:");
        for key in &report.keys {
            let _ = writeln!(
                out,
                "  {} {}",
                mark(key.configured),
                key.key
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Server URL: {}", report.url);
        let _ = write!(
            out,
            "Status: {}",
            if report.ready { "ready" } else { "not ready" }
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_file::KeyStatus;
    use crate::preflight::PackageCheck;
    use std::path::PathBuf;

    fn report() -> PreflightReport {
        let present = |p: &str| PathCheck {
            path: PathBuf::from(p),
            present: true,
        };
        PreflightReport {
            python: "python3".to_string(),
            bootstrap_skipped: false,
            packages: vec![PackageCheck {
                name: "python-dotenv".to_string(),
                installed: Some(false),
                error: None,
            }],
            env_file: present(".env"),
            keys: vec![
                KeyStatus {
                    key: "GOOGLE_API_KEY".to_string(),
                    configured: true,
                },
                KeyStatus {
                    key: "OPENAI_API_KEY".to_string(),
                    configured: false,
                },
            ],
            frontend_dir: present("frontend"),
            source_marker: present("frontend/index.html"),
            backend_entry: present("backend/main.py"),
            port: 8080,
            url: "http://localhost:8080".to_string(),
            ready: true,
        }
    }

    #[test]
    fn test_json_output() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_preflight(&report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["ready"], true);
        assert_eq!(value["port"], 8080);
        assert_eq!(value["keys"][1]["configured"], false);
        assert!(value["packages"][0].get("error").is_none());
    }

    #[test]
    fn test_yaml_output() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_preflight(&report())
            .unwrap();
        assert!(output.contains("url:"));
        assert!(output.contains("http://localhost:8080"));
    }

    #[test]
    fn test_human_output() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_preflight(&report())
            .unwrap();

        assert!(output.contains("python-dotenv (will be installed)"));
        assert!(output.contains("✓ GOOGLE_API_KEY"));
        assert!(output.contains("✗ OPENAI_API_KEY"));
        assert!(output.ends_with("Status: ready"));
    }
}
