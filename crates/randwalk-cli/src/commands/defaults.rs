use crate::config::{DefaultsConfig, FileConfig};
use crate::error::Result;
use tracing::info;

pub fn run() -> Result<()> {
    info!("Rendering the built-in configuration.");
    print!("{}", render()?);
    Ok(())
}

fn render() -> Result<String> {
    FileConfig::from_defaults(&DefaultsConfig::default()).to_toml_string()
}
