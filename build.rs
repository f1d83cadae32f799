use std::env;
use std::process::Command;

fn rustc_output(args: &[&str]) -> Option<String> {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let output = Command::new(rustc).args(args).output().ok()?;
    String::from_utf8(output.stdout).ok()
}

fn main() {
    // Set RUSTC_VERSION if not already set
    if env::var("RUSTC_VERSION").is_err() {
        let version = rustc_output(&["--version"])
            .and_then(|out| out.split_whitespace().nth(1).map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        println!("cargo:rustc-env=RUSTC_VERSION={}", version);
    }

    // Cargo only exposes TARGET to build scripts
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=BUILD_TARGET={}", target);

    // Set BUILD_TIMESTAMP if not already set
    if env::var("BUILD_TIMESTAMP").is_err() {
        let timestamp = chrono::Utc::now().to_rfc3339();
        println!("cargo:rustc-env=BUILD_TIMESTAMP={}", timestamp);
    }

    println!("cargo:rerun-if-env-changed=RUSTC_VERSION");
    println!("cargo:rerun-if-env-changed=BUILD_TIMESTAMP");
}
