use crate::commands::update::format_size;
use crate::core::config::Config;
use crate::core::updater::Updater;
use crate::error::Result;

pub fn list_packages(config: Config, version: Option<&str>) -> Result<()> {
    let platform = config.platform.clone();
    let package_type = config.package_type.clone();
    let mut updater = Updater::from_config(config)?;

    let version = match version {
        Some(version) => version.to_string(),
        None => updater.latest_version()?,
    };
    let listing = updater.packages(&version)?;

    if listing.is_empty() {
        println!("No packages published for {version}.");
        return Ok(());
    }

    let selected = listing
        .select(&platform, &package_type)
        .ok()
        .map(|p| p.name.clone());

    println!("Packages for {version}:");
    for package in listing.iter() {
        let marker = if selected.as_deref() == Some(package.name.as_str()) {
            "* "
        } else {
            "  "
        };
        let modified = package
            .modified()
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| format!("{} {}", package.date, package.time));
        println!(
            "{marker}{:<50} {:>10}  {modified}",
            package.name,
            format_size(package.size_bytes)
        );
    }

    if selected.is_none() {
        println!();
        println!("⚠️  No package matches platform '{platform}' and type '{package_type}'");
    }
    Ok(())
}
