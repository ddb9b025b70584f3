use crate::core::config::Config;
use crate::error::Result;

pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
