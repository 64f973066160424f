use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let version = format!("{}-{}", env!("CARGO_PKG_VERSION"), git_hash);
    println!("cargo:rustc-env=TRIVIA_VERSION={}", version);
    println!("cargo:rerun-if-changed=migrations");
}
