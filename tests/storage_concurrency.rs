mod support;

use std::process::Command;
use std::sync::{Arc, Barrier};
use std::thread;

use assert_cmd::cargo::cargo_bin;
use weekplan::error::Error;
use weekplan::lock::FileLock;
use weekplan::storage::Storage;

use support::TestHousehold;

#[test]
fn concurrent_updates_are_not_lost() {
    let household = TestHousehold::init(false);
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|idx| {
            let barrier = Arc::clone(&barrier);
            let dir = household.data_dir();
            thread::spawn(move || {
                let storage = Storage::open(dir);
                barrier.wait();
                storage
                    .update_household(|household| household.add_task(&format!("Chore {idx}")))
                    .expect("update");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let storage = Storage::open(household.data_dir());
    assert_eq!(storage.load_household().expect("load").tasks.len(), threads);
}

#[test]
fn concurrent_cli_processes_keep_every_person() {
    let household = TestHousehold::init(false);
    let children: Vec<_> = (0..6)
        .map(|idx| {
            Command::new(cargo_bin("weekplan"))
                .arg("--dir")
                .arg(household.data_dir())
                .args(["--quiet", "person", "add"])
                .arg(format!("Person {idx}"))
                .env_remove("WEEKPLAN_DIR")
                .spawn()
                .expect("spawn weekplan")
        })
        .collect();
    for mut child in children {
        assert!(child.wait().expect("wait").success());
    }

    let list = household.json(&["person", "list"]);
    assert_eq!(list["persons"].as_array().map(Vec::len), Some(6));
}

#[test]
fn held_lock_fails_update_after_timeout() -> Result<(), Box<dyn std::error::Error>> {
    let household = TestHousehold::init(false);
    std::fs::write(
        household.data_dir().join("weekplan.toml"),
        "[store]\nlock_timeout_ms = 50\n",
    )?;

    let storage = Storage::open(household.data_dir());
    let _held = FileLock::acquire(storage.lock_file(), 1000)?;

    let err = storage
        .update_household(|household| household.add_person("Kim"))
        .expect_err("lock is held");
    assert!(matches!(err, Error::LockFailed(_)));
    assert!(storage.load_household()?.persons.is_empty());
    Ok(())
}
