//! Listing flags: `--list-actions`, `--list-rules`, and `--paths`.
//!
//! All three are read-only reconnaissance: what can run, what it can run
//! against, and where those files are searched for.

use console::style;
use vaultic::paths::{self, RootListing};

/// Print the search roots in order, marking missing ones, plus where new
/// files will land.
pub fn print_paths() {
    println!();
    for root in paths::roots() {
        if root.is_dir() {
            println!("  {}", style(root.display()).bold());
        } else {
            println!(
                "  {}  {}",
                style(root.display()).bold(),
                style("(missing)").dim()
            );
        }
    }
    println!();
    println!(
        "  new files land in {}",
        style(paths::data_path().display()).cyan()
    );
    println!();
}

pub fn print_actions() {
    print_listings("actions", &paths::list_actions());
}

pub fn print_rules() {
    print_listings("rules", &paths::list_rules());
}

fn print_listings(kind: &str, listings: &[RootListing]) {
    println!();
    for listing in listings {
        println!(
            "  {}  {}",
            style(listing.root.display()).bold(),
            style(format!("({kind})")).dim()
        );
        if listing.names.is_empty() {
            println!("    {}", style("(none)").dim());
        } else {
            for name in &listing.names {
                println!("    {name}");
            }
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn listings_render_without_panicking() {
        // Smoke test; the integration tests assert on real output.
        let listings = vec![
            RootListing {
                root: PathBuf::from("/usr/local/etc/vaultic"),
                names: vec!["copy".into(), "sync".into()],
            },
            RootListing {
                root: PathBuf::from("/home/alice/.config/vaultic"),
                names: vec![],
            },
        ];
        print_listings("actions", &listings);
    }
}
