//! Standalone config-file sanity checker.
//!
//! Loads a `nixy.toml`-style file the same way the controller does, without
//! starting any of the supervisor's long-lived tasks, and reports which
//! fields are missing or look wrong. Useful in CI and for operators before a
//! deploy.
//!
//! Run with: cargo run -p proxyctl-config --bin validate-config -- -f nixy.toml

use std::path::PathBuf;

use clap::Parser;
use proxyctl_config::Settings;

#[derive(Parser)]
#[command(about = "Validate a proxyctl configuration file without starting the controller")]
struct Args {
    #[arg(short = 'f', long = "config", default_value = "nixy.toml")]
    config: PathBuf,
}

fn main() {
    let args = Args::parse();

    println!("🔍 Validating proxyctl Configuration ({})...\n", args.config.display());

    let settings = match Settings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ FAIL: {e:#}");
            std::process::exit(1);
        }
    };

    let mut warnings = Vec::new();

    // ========== Orchestrator Endpoints ==========
    println!("📡 Orchestrator Endpoints:");
    println!("  ✓ endpoints: {}", settings.endpoints.join(", "));
    if settings.credentials.is_some() {
        println!("  ✓ credentials: configured");
    } else {
        println!("  ⚠ credentials: none (requests will be unauthenticated)");
    }
    println!();

    // ========== Proxy & Reload ==========
    println!("🪝 Proxy & Reload:");
    println!("  ✓ proxy.command: {}", settings.proxy.command);
    println!(
        "  ✓ proxy.rendered_config_path: {}",
        settings.proxy.rendered_config_path.display()
    );
    if let Some(parent) = settings.proxy.rendered_config_path.parent() {
        if parent.exists() {
            println!("  ✓ rendered config directory: {}", parent.display());
        } else {
            warnings.push(format!("rendered config directory {} does not exist", parent.display()));
            println!("  ⚠ rendered config directory: {} (does not exist)", parent.display());
        }
    }
    if settings.proxy.check_bypass {
        warnings.push("proxy.check_bypass is set: invalid configs can reach disk".to_string());
        println!("  ⚠ proxy.check_bypass: true (syntax check is skipped before every swap)");
    } else {
        println!("  ✓ proxy.check_bypass: false");
    }
    println!();

    // ========== Template ==========
    println!("📦 Template:");
    if settings.template.path.exists() {
        println!("  ✓ template.path: {}", settings.template.path.display());
    } else {
        warnings.push(format!("template path {} does not exist", settings.template.path.display()));
        println!("  ⚠ template.path: {} (does not exist)", settings.template.path.display());
    }
    println!(
        "  ✓ template.delimiters: {} {}",
        settings.template.left_delimiter, settings.template.right_delimiter
    );
    println!();

    // ========== Status Server ==========
    println!("🌐 Status Server:");
    println!("  ✓ port: {}", settings.port);
    println!("  ✓ xproxy: {}", settings.xproxy);
    println!();

    // ========== Reconciliation ==========
    println!("📊 Reconciliation:");
    println!("  ✓ legacy_host_sanitization: {}", settings.legacy_host_sanitization);
    println!();

    // ========== Summary ==========
    println!("═══════════════════════════════════════════════");
    if warnings.is_empty() {
        println!("✅ Configuration is valid! All settings look correct.");
        std::process::exit(0);
    }

    println!("\n⚠️  Warnings ({}):", warnings.len());
    for w in &warnings {
        println!("   - {w}");
    }
    println!("\n✅ Configuration is valid (with {} warnings)", warnings.len());
}
