//! Smoke command implementation.
//!
//! Drives every environment operation the way a storage engine would on
//! first open: lock, write a log, sync, read it back both ways, publish a
//! file by rename, list, and clean up.

use objenv_core::{read_file_to_vec, write_file, Env, ObjectEnv};
use tracing::info;

const LOG_RECORDS: [&[u8]; 3] = [b"A", b"B", b"C"];

/// Runs the smoke sequence under `dir`.
pub fn run(env: &ObjectEnv, dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log_name = format!("{dir}/000001.log");
    let temp_name = format!("{dir}/CURRENT.tmp");
    let current_name = format!("{dir}/CURRENT");
    let lock_name = format!("{dir}/LOCK");

    info!("Running smoke test in {:?}", dir);
    env.create_dir(dir)?;
    let lock = env.lock_file(&lock_name)?;

    let mut log = env.new_writable_file(&log_name)?;
    for record in LOG_RECORDS {
        log.append(record)?;
    }
    log.flush()?;
    log.sync()?;
    log.close()?;

    let expected: Vec<u8> = LOG_RECORDS.concat();
    let size = env.file_size(&log_name)?;
    check(size == expected.len() as u64, "log size after sync")?;

    let table = env.new_random_access_file(&log_name)?;
    check(table.read_at(0, expected.len())? == expected, "random read")?;

    let mut seq = env.new_sequential_file(&log_name)?;
    seq.skip(1)?;
    check(seq.read(2)? == table.read_at(1, 2)?, "skip then read")?;

    write_file(env, &temp_name, b"MANIFEST-000001\n", true)?;
    env.rename_file(&temp_name, &current_name)?;
    check(!env.file_exists(&temp_name), "rename removed source")?;
    check(
        read_file_to_vec(env, &current_name)? == b"MANIFEST-000001\n",
        "rename preserved content",
    )?;

    let mut children = env.children(dir)?;
    children.sort();
    println!("{} contains: {}", dir, children.join(", "));

    for name in [&log_name, &current_name] {
        env.remove_file(name)?;
    }
    env.unlock_file(lock)?;
    env.remove_dir(dir)?;

    println!("Smoke test passed");
    Ok(())
}

fn check(ok: bool, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if ok {
        Ok(())
    } else {
        Err(format!("smoke check failed: {what}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objenv_store::DirStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn smoke_passes_on_dir_store() {
        let dir = tempdir().unwrap();
        let env = ObjectEnv::new(Arc::new(DirStore::open(dir.path()).unwrap()));
        run(&env, "smoke").unwrap();
        assert!(env.children("smoke").unwrap().is_empty());
        assert_eq!(env.locks_held(), 0);
    }
}
