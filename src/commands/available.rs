use crate::core::config::Config;
use crate::core::updater::Updater;
use crate::error::Result;

pub fn list_available_versions(config: Config) -> Result<()> {
    let mut updater = Updater::from_config(config)?;
    let versions = updater.available_versions()?;
    let installed = updater.installed();
    let project = updater.config().project.clone();

    if versions.is_empty() {
        println!("No {project} releases available.");
        return Ok(());
    }

    println!("Available {project} versions:");
    let latest = versions.len() - 1;
    for (i, version) in versions.iter().enumerate() {
        let status = if i == latest { " (latest)" } else { "" };
        let marker = if installed.is_installed(version) {
            " [installed]"
        } else {
            ""
        };
        println!("  {version}{status}{marker}");
    }

    println!();
    println!("Install: blupd8 update --version <version>");
    Ok(())
}
