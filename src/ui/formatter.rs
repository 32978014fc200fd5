//! Pure formatting functions for UI output.
//!
//! Everything here only prints; interaction lives in the parent module.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the tag change a release is about to make.
///
/// Shows either:
/// - If updating: "From: old_tag" and "To: new_tag"
/// - If initial: "Initial Tag: new_tag"
pub fn display_proposed_tag(old_tag: Option<&str>, new_tag: &str) {
    match old_tag {
        Some(old) => {
            println!("\n{}", style("Proposed Tag Change:").bold());
            println!("  From: {}", style(old).red());
            println!("  To:   {}", style(new_tag).green());
        }
        None => {
            println!("\n{}", style("Initial Tag:").bold());
            println!("  New tag: {}", style(new_tag).green());
        }
    }
}

/// Print the rendered changelog under a `CHANGELOG:` banner
pub fn display_changelog(rendered: &str) {
    println!("\n{}\n", style("CHANGELOG:").bold());
    println!("{}", rendered);
}

/// Tell the operator how to finish a release whose publishing step failed
pub fn display_manual_release_instruction(tag: &str, program: &str) {
    println!(
        "\n{} Tag {} is already on the remote. Create the release manually:\n  {}",
        style("→").yellow(),
        tag,
        style(format!("{} release create {} -t {}", program, tag, tag)).cyan()
    );
}
