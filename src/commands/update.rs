use crate::core::config::Config;
use crate::core::updater::{ProgressObserver, UpdateOutcome, Updater};
use crate::error::Result;
use std::io::Write;

/// Prints download and extraction progress on a single console line.
#[derive(Default)]
struct ConsoleProgress {
    last_percent: Option<u64>,
}

impl ConsoleProgress {
    fn redraw(&self, line: &str) {
        print!("\r{line:<60}");
        let _ = std::io::stdout().flush();
    }
}

impl ProgressObserver for ConsoleProgress {
    fn download(&mut self, received: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => {
                let percent = received * 100 / total;
                if self.last_percent != Some(percent) {
                    self.last_percent = Some(percent);
                    self.redraw(&format!(
                        "⬇️  Downloading... {percent:>3}% ({} / {})",
                        format_size(received),
                        format_size(total)
                    ));
                }
            }
            _ => self.redraw(&format!("⬇️  Downloading... {}", format_size(received))),
        }
    }

    fn extract(&mut self, index: usize, total: usize) {
        if index == 0 {
            println!();
        }
        self.redraw(&format!("📦 Extracting... {}/{}", index + 1, total));
        if index + 1 == total {
            println!();
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / MB)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

pub fn run_update(config: Config, version: Option<&str>) -> Result<()> {
    println!("🔄 Checking {} for {} releases...", config.releases_url, config.project);

    let mut updater = Updater::from_config(config)?;
    let mut progress = ConsoleProgress::default();
    let outcome = match version {
        Some(version) => updater.update_to(version, &mut progress)?,
        None => updater.update(&mut progress)?,
    };

    match outcome {
        UpdateOutcome::AlreadyInstalled { version, path } => {
            println!("✅ {} {version} is already installed", updater.config().project);
            println!("   Location: {}", path.display());
        }
        UpdateOutcome::Installed {
            version,
            path,
            package,
            summary,
        } => {
            println!(
                "✅ Installed {} {version} from {}",
                updater.config().project,
                package.name
            );
            println!("   Location: {}", path.display());
            println!("   Files: {}", summary.files);
            if summary.links > 0 {
                println!("   Links: {}", summary.links);
            }
        }
    }

    Ok(())
}
