//! Pure formatting functions for UI output.
//!
//! All user-facing output of the release workflow goes through here; the
//! prompts live in the parent module.

use console::style;

use crate::workflow::ReleaseRecord;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a warning in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print the captured output of an external tool, if any.
pub fn display_tool_output(output: &str) {
    let trimmed = output.trim_end();
    if !trimmed.is_empty() {
        println!("{}", trimmed);
    }
}

/// Lines of the final release report.
pub fn format_release_summary(records: &[ReleaseRecord]) -> Vec<String> {
    let mut lines = vec![
        "Github releases: ".to_string(),
        "-------------------".to_string(),
    ];
    for record in records {
        lines.push(format!("🔗 {}", record.url));
    }
    lines
}

/// Display the published releases followed by the success banner.
pub fn display_release_summary(records: &[ReleaseRecord]) {
    println!();
    for line in format_release_summary(records) {
        println!("{}", style(line).bold());
    }
    println!();
    println!("{}", style("Release successful! 🚀").green().bold());
}

/// Display the releases that were published before a failure stopped the run.
pub fn display_partial_releases(records: &[ReleaseRecord]) {
    if records.is_empty() {
        return;
    }
    eprintln!("{}", style("Releases published before the failure:").bold());
    for record in records {
        eprintln!("  {} {} ({})", style("🔗").dim(), record.url, record.tag_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_summary_lists_every_url() {
        let records = vec![
            ReleaseRecord {
                package: "@scope/pkg-a".to_string(),
                tag_name: "@scope/pkg-a@1.2.0".to_string(),
                url: "https://github.com/acme/widgets/releases/tag/a".to_string(),
            },
            ReleaseRecord {
                package: "pkg-b".to_string(),
                tag_name: "pkg-b@0.1.0".to_string(),
                url: "https://github.com/acme/widgets/releases/tag/b".to_string(),
            },
        ];

        let lines = format_release_summary(&records);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "🔗 https://github.com/acme/widgets/releases/tag/a");
        assert_eq!(lines[3], "🔗 https://github.com/acme/widgets/releases/tag/b");
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_status("test status");
        display_success("test success");
        display_warning("test warning");
        display_error("test error");
        display_tool_output("");
        display_partial_releases(&[]);
    }
}
