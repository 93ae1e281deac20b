//! config command - Get, set, list or locate configuration values

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::schema::{parse_mode, GlobalConfig, SidecarConfig};
use crate::core::config::Config;
use crate::ui::output;

/// Keys accepted by `config get` and `config set`.
const KEYS: &[&str] = &[
    "save_in_image_file",
    "sidecar.local",
    "sidecar.cache_dir",
    "sidecar.dir_mode",
];

/// Get a configuration value.
///
/// Unset values print nothing.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    match lookup(&ctx.config.global, key)? {
        Some(value) => println!("{}", value),
        None => output::debug(format!("{} is not set", key), ctx.verbosity),
    }
    Ok(())
}

/// Set a configuration value and save the file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = target_path(ctx)?;

    let mut config = ctx.config.global.clone();
    assign(&mut config, key, value)?;

    Config::write_to(&path, &config).context("Failed to write config")?;

    output::print(format!("Set {} = {}", key, value), ctx.verbosity);
    Ok(())
}

/// List all configuration values with their effective defaults.
pub fn list(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config file, defaults)"),
    }

    let config = &ctx.config;
    println!("save_in_image_file = {}", config.save_in_image_file());
    println!("sidecar.local = {}", config.sidecar_local());
    match config.cache_root() {
        Ok(root) => println!("sidecar.cache_dir = {}", root.display()),
        Err(e) => println!("sidecar.cache_dir = (unavailable: {})", e),
    }
    println!("sidecar.dir_mode = {:04o}", config.dir_mode());

    Ok(())
}

/// Print the config file path that is read and written.
pub fn path(ctx: &Context) -> Result<()> {
    println!("{}", target_path(ctx)?.display());
    Ok(())
}

/// The file `config set` writes: `--config`, else the loaded file, else the
/// canonical location.
fn target_path(ctx: &Context) -> Result<PathBuf> {
    if let Some(path) = &ctx.config_path {
        return Ok(path.clone());
    }
    if let Some(path) = ctx.config.loaded_from() {
        return Ok(path.to_path_buf());
    }
    Config::default_config_path().context("Failed to determine config location")
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown configuration key: {} (expected one of: {})",
        key,
        KEYS.join(", ")
    )
}

fn lookup(config: &GlobalConfig, key: &str) -> Result<Option<String>> {
    let sidecar = config.sidecar.as_ref();
    let value = match key {
        "save_in_image_file" => config.save_in_image_file.map(|v| v.to_string()),
        "sidecar.local" => sidecar.and_then(|s| s.local).map(|v| v.to_string()),
        "sidecar.cache_dir" => sidecar
            .and_then(|s| s.cache_dir.as_ref())
            .map(|p| p.display().to_string()),
        "sidecar.dir_mode" => sidecar.and_then(|s| s.dir_mode.clone()),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

fn assign(config: &mut GlobalConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "save_in_image_file" => config.save_in_image_file = Some(parse_bool(key, value)?),
        "sidecar.local" => {
            let local = parse_bool(key, value)?;
            sidecar_mut(config).local = Some(local);
        }
        "sidecar.cache_dir" => {
            if value.is_empty() {
                bail!("sidecar.cache_dir cannot be empty");
            }
            sidecar_mut(config).cache_dir = Some(PathBuf::from(value));
        }
        "sidecar.dir_mode" => {
            parse_mode(value)?;
            sidecar_mut(config).dir_mode = Some(value.to_string());
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

fn sidecar_mut(config: &mut GlobalConfig) -> &mut SidecarConfig {
    config.sidecar.get_or_insert_with(SidecarConfig::default)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("Invalid value for {}: '{}' (expected true or false)", key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_lookup() {
        let mut config = GlobalConfig::default();

        assign(&mut config, "save_in_image_file", "yes").expect("bool");
        assign(&mut config, "sidecar.dir_mode", "0700").expect("mode");
        assign(&mut config, "sidecar.cache_dir", "/tmp/c").expect("dir");

        assert_eq!(lookup(&config, "save_in_image_file").unwrap().as_deref(), Some("true"));
        assert_eq!(lookup(&config, "sidecar.dir_mode").unwrap().as_deref(), Some("0700"));
        assert_eq!(lookup(&config, "sidecar.cache_dir").unwrap().as_deref(), Some("/tmp/c"));
        assert_eq!(lookup(&config, "sidecar.local").unwrap(), None);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = GlobalConfig::default();
        assert!(assign(&mut config, "sidecar.dir_mode", "999").is_err());
        assert!(assign(&mut config, "sidecar.local", "maybe").is_err());
        assert!(assign(&mut config, "nope", "1").is_err());
        assert!(lookup(&config, "nope").is_err());
        assert_eq!(config, GlobalConfig::default());
    }
}
