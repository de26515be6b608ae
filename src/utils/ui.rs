use crate::core::models::BuildResult;
use colored::*;

/// Human-facing build output on stdout
pub struct BuildReporter;

impl BuildReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn show_banner(&self) {
        println!("\n  {} {}", "MINIPACK".bright_cyan().bold(), env!("CARGO_PKG_VERSION").bright_white());
        println!();
    }

    pub fn show_completion(&self, result: &BuildResult) {
        println!();
        println!("  {} {} {}",
            result.output.path.display().to_string().bright_cyan(),
            format!("({})", format_size(result.output.size)).bright_black(),
            format!("{} modules", result.modules).bright_black()
        );

        println!();
        println!("  {} built in {}",
            "✓".bright_green(),
            format!("{:.0}ms", result.build_time.as_secs_f64() * 1000.0).bright_white().bold()
        );
    }

    pub fn show_failure(&self, detail: &str) {
        eprintln!();
        eprintln!("  {} {}", "✗".bright_red(), "build failed".bright_red().bold());
        for line in detail.lines() {
            eprintln!("  {}", line);
        }
    }
}

impl Default for BuildReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_size(bytes: usize) -> String {
    let size_kb = bytes as f64 / 1024.0;
    if size_kb < 1.0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} kB", size_kb)
    }
}
