//! Property tests for the object-backed environment.

use objenv_core::{read_file_to_vec, Env, EnvError};
use objenv_store::{ObjectStore, StoreOp};
use objenv_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #![proptest_config(env_proptest_config())]

    #[test]
    fn skip_then_read_matches_random_read(
        content in content_strategy(4096),
        skip_frac in 0.0f64..=1.0,
        n in 0usize..512,
    ) {
        let test_env = TestEnv::memory();
        test_env.memory_store().write_full("db/000007.ldb", &content).unwrap();

        let k = (content.len() as f64 * skip_frac) as u64;
        let mut seq = test_env.new_sequential_file("db/000007.ldb").unwrap();
        seq.skip(k).unwrap();
        let via_skip = seq.read(n).unwrap();

        let table = test_env.new_random_access_file("db/000007.ldb").unwrap();
        let via_offset = table.read_at(k, n).unwrap();

        prop_assert_eq!(via_skip, via_offset);
    }

    #[test]
    fn synced_appends_read_back_in_order(chunks in append_sequence_strategy(0, 32)) {
        let test_env = TestEnv::memory();
        let mut log = test_env.new_writable_file("000001.log").unwrap();
        for chunk in &chunks {
            log.append(chunk).unwrap();
        }
        log.sync().unwrap();

        let expected: Vec<u8> = chunks.concat();
        let table = test_env.new_random_access_file("000001.log").unwrap();
        prop_assert_eq!(table.read_at(0, expected.len() + 1).unwrap(), expected.clone());
        prop_assert_eq!(read_file_to_vec(&test_env.env, "000001.log").unwrap(), expected);
    }

    #[test]
    fn sync_reports_failed_append(
        before in append_sequence_strategy(0, 8),
        failing in chunk_strategy().prop_filter("non-empty", |c| !c.is_empty()),
        after in append_sequence_strategy(0, 8),
    ) {
        let test_env = TestEnv::memory();
        let store = test_env.memory_store();
        let mut writer = test_env.open_writer("000002.log", objenv_core::WriteMode::Truncate).unwrap();

        for chunk in &before {
            objenv_core::WritableFile::append(&mut writer, chunk).unwrap();
        }
        objenv_core::WritableFile::sync(&mut writer).unwrap();

        store.inject_fault(StoreOp::Append, "000002.log");
        objenv_core::WritableFile::append(&mut writer, &failing).unwrap();
        for chunk in &after {
            objenv_core::WritableFile::append(&mut writer, chunk).unwrap();
        }

        let result = objenv_core::WritableFile::sync(&mut writer);
        let is_io_err = matches!(result, Err(EnvError::Io { .. }));
        prop_assert!(is_io_err);
        prop_assert_eq!(writer.outstanding(), 0);

        let mut expected = before.concat();
        expected.extend(after.concat());
        prop_assert_eq!(store.object("000002.log").unwrap(), expected);
    }

    #[test]
    fn exists_follows_creation(names in name_set_strategy(16)) {
        let test_env = TestEnv::memory();
        for name in &names {
            prop_assert!(!test_env.file_exists(name));
            let mut file = test_env.new_writable_file(name).unwrap();
            file.append(b"x").unwrap();
            prop_assert!(test_env.file_exists(name));
            file.sync().unwrap();
        }
    }

    #[test]
    fn children_are_created_names_stripped(
        names in name_set_strategy(24),
        noise in name_set_strategy(8),
        reverse in any::<bool>(),
    ) {
        let test_env = TestEnv::memory();
        let store = test_env.memory_store();

        let mut order: Vec<&String> = names.iter().collect();
        if reverse {
            order.reverse();
        }
        for name in order {
            store.write_full(&format!("db/{name}"), name.as_bytes()).unwrap();
        }
        for name in &noise {
            store.write_full(&format!("other/{name}"), b"").unwrap();
        }

        let listed: BTreeSet<String> = test_env.children("db").unwrap().into_iter().collect();
        prop_assert_eq!(listed, names);
    }

    #[test]
    fn rename_preserves_content(content in content_strategy(2048)) {
        let test_env = TestEnv::memory();
        let store = test_env.memory_store();
        store.write_full("db/000003.log.tmp", &content).unwrap();

        test_env.rename_file("db/000003.log.tmp", "db/000003.log").unwrap();

        prop_assert!(!test_env.file_exists("db/000003.log.tmp"));
        prop_assert_eq!(test_env.file_size("db/000003.log").unwrap(), content.len() as u64);
        prop_assert_eq!(read_file_to_vec(&test_env.env, "db/000003.log").unwrap(), content);
    }
}
