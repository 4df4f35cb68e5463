//! Environment readiness check.

use crate::config::HarvestConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium availability, the configuration file, and the output
/// directory.
pub async fn run(config_path: &Path) -> Result<()> {
    println!("Pagesift Doctor");
    println!("===============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let config = match HarvestConfig::load(config_path) {
        Ok(config) => {
            println!(
                "[OK] Config {}: {} seed(s), {} example(s), pagination {}",
                config_path.display(),
                config.start_urls.len(),
                config.examples.wanted().len(),
                config.pagination_selector.as_deref().unwrap_or("off"),
            );
            Some(config)
        }
        Err(e) => {
            println!("[!!] {e}");
            None
        }
    };

    let chromium = config
        .as_ref()
        .and_then(|c| c.chromium_path.clone())
        .filter(|p| p.exists())
        .or_else(find_chromium);
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set PAGESIFT_CHROMIUM_PATH."
        ),
    }

    if let Some(config) = &config {
        match config.output.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) if dir.is_dir() => {
                println!("[OK] Output directory {} exists", dir.display())
            }
            Some(dir) => println!(
                "[??] Output directory {} will be created on first write",
                dir.display()
            ),
            None => println!("[OK] Output goes to the working directory"),
        }
    }

    println!();
    if chromium.is_some() && config.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
