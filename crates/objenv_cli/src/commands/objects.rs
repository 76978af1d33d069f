//! Single-file commands: ls, stat, cat, put, mv, rm.

use objenv_core::{read_file_to_vec, Env, ObjectEnv, WritableFile, WriteMode};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::info;

/// Metadata printed by `stat`.
#[derive(Debug, Serialize)]
pub struct StatResult {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u64,
}

/// Lists the files under `dir`, sorted.
pub fn list(env: &ObjectEnv, dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut names = env.children(dir)?;
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Prints size and modification time of `name`.
pub fn stat(env: &ObjectEnv, name: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stat = env.store().stat(name)?;
    let result = StatResult {
        name: name.to_string(),
        size: stat.size,
        mtime: stat
            .mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            println!("Name:  {}", result.name);
            println!("Size:  {} bytes", result.size);
            println!("Mtime: {}", result.mtime);
        }
    }
    Ok(())
}

/// Writes the content of `name` to stdout.
pub fn cat(env: &ObjectEnv, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_file_to_vec(env, name)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

/// Writes `input` (or stdin) to `name` and syncs it.
pub fn put(
    env: &ObjectEnv,
    name: &str,
    input: Option<&Path>,
    append: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut data = Vec::new();
    match input {
        Some(path) => {
            File::open(path)?.read_to_end(&mut data)?;
        }
        None => {
            io::stdin().lock().read_to_end(&mut data)?;
        }
    }

    let mode = if append {
        WriteMode::Append
    } else {
        WriteMode::Truncate
    };
    let mut writer = env.open_writer(name, mode)?;
    writer.append(&data)?;
    writer.sync()?;
    writer.close()?;

    info!("Wrote {} bytes to {} ({} total)", data.len(), name, writer.size());
    Ok(())
}

/// Renames `src` to `dst`.
pub fn rename(env: &ObjectEnv, src: &str, dst: &str) -> Result<(), Box<dyn std::error::Error>> {
    env.rename_file(src, dst)?;
    info!("Renamed {} to {}", src, dst);
    Ok(())
}

/// Deletes `name`.
pub fn remove(env: &ObjectEnv, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    env.remove_file(name)?;
    info!("Removed {}", name);
    Ok(())
}
