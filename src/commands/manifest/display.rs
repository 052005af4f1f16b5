//! Console output for manifest commands.

use crate::manifest::ManifestTarget;
use crate::store::ObjectEntry;
use colored::Colorize;

pub fn print_listing(manifest: &ManifestTarget, entries: &[ObjectEntry]) {
    let location = match manifest.prefix() {
        "" => manifest.bucket.clone(),
        prefix => format!("{}/{}", manifest.bucket, prefix),
    };

    if entries.is_empty() {
        println!("{} {}", "No objects under".yellow(), location);
        return;
    }

    println!("Objects under {}:", location.cyan());
    for entry in entries {
        let modified = entry
            .last_modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!("  {:>10}  {}  {}", entry.size, modified, entry.key);
        if entry.key == manifest.key {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
}
