use std::process::Command;

fn main() {
    println!(
        "cargo:rustc-env=HUNK_MINER_BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    println!(
        "cargo:rustc-env=HUNK_MINER_REVISION={}",
        source_revision().unwrap_or_else(|| "unknown".to_string())
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}

/// Abbreviated commit of the source tree, suffixed `-dirty` when it has
/// uncommitted edits; `None` outside a checkout
fn source_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=10"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8(output.stdout).ok()?;
    Some(revision.trim().to_string()).filter(|r| !r.is_empty())
}
