use std::{fs, path::Path};

use crate::{config::Config, error::Error};

/// Load configuration from file
///
/// A relative `token_bytecode` path is rebased onto the config file's directory.
pub fn load_config(config_file: &Path) -> Result<Config, Error> {
    let content =
        fs::read_to_string(config_file).map_err(|_| Error::OpenFile(config_file.to_path_buf()))?;
    let mut config: Config = toml::from_str(&content)
        .map_err(|e| Error::Parse { path: config_file.to_path_buf(), reason: e.to_string() })?;

    if config.token_bytecode.is_relative() &&
        let Some(dir) = config_file.parent()
    {
        config.token_bytecode = dir.join(&config.token_bytecode);
    }

    Ok(config)
}

/// Read the hex-encoded deployment bytecode of the token contract
pub fn load_bytecode(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|_| Error::OpenFile(path.to_path_buf()))
}

/// Write data to file, creating parent directories as needed
pub fn save(path: &Path, data: &str) -> Result<(), Error> {
    use std::io::Write;

    if let Some(parent_dir) = path.parent() &&
        !parent_dir.as_os_str().is_empty()
    {
        fs::create_dir_all(parent_dir).map_err(|_| Error::ParentDir(parent_dir.to_path_buf()))?;
    }

    let mut f = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|_| Error::OpenFile(path.to_path_buf()))?;

    f.write_all(data.as_bytes()).map_err(|_| Error::WriteFile(path.to_path_buf()))?;

    Ok(())
}
