use std::path::Path;
use std::process::Command;

/// `git describe` of the workspace checkout, `-dirty` when it has local edits.
fn describe(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .current_dir(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let workspace = Path::new(&manifest).join("..");

    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", workspace.join(watched).display());
    }
    let version = describe(&workspace).unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=YNAB_BUILD_SHA={version}");
}
