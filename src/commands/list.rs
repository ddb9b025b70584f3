use crate::core::config::Config;
use crate::core::installed::InstalledVersions;
use crate::error::Result;

pub fn list_versions(config: &Config) -> Result<()> {
    let installed = InstalledVersions::new(&config.install_root, &config.project).scan()?;

    if installed.is_empty() {
        println!("No {} versions installed.", config.project);
        println!();
        println!("To install the latest version, run:");
        println!("  blupd8 update");
        return Ok(());
    }

    println!("Installed {} versions:", config.project);
    println!();
    for (name, path) in &installed {
        println!("  {name}");
        println!("    {}", path.display());
    }

    Ok(())
}
