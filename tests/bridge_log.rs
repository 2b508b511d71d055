// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg(feature = "bridge-log")]

use std::fs;
use std::num::NonZeroU64;
use std::thread;

use log::LevelFilter;
use sizeroll::Rotator;
use sizeroll::bridge::RotatingFileLogger;
use tempfile::TempDir;

// The global logger can be set once per process; this file holds a single test.
#[test]
fn test_global_logger_rotates_by_size() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("app.log");

    let rotator = Rotator::builder(&path)
        .rotation_size(NonZeroU64::new(512).unwrap())
        .build()
        .unwrap();
    RotatingFileLogger::new(rotator)
        .level(LevelFilter::Info)
        .try_apply()
        .unwrap();
    assert!(
        RotatingFileLogger::new(Rotator::open(temp_dir.path().join("other.log")).unwrap())
            .try_apply()
            .is_err()
    );

    let handles = (0..4)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..50 {
                    log::info!("thread {t} entry {i}: {}", "A".repeat(20));
                    log::debug!("filtered out");
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }
    log::logger().flush();

    let mut files = vec![path.clone()];
    let mut slot = 1;
    loop {
        let backup = temp_dir.path().join(format!("app.log.{slot}"));
        if !backup.exists() {
            break;
        }
        files.push(backup);
        slot += 1;
    }
    assert!(files.len() > 1, "expected rotated files, found {files:?}");

    let mut lines = 0;
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        assert!(content.len() <= 512, "{} is oversized", file.display());
        for line in content.lines() {
            assert!(line.contains(" INFO "), "{line}");
            assert!(line.ends_with(&"A".repeat(20)), "{line}");
            lines += 1;
        }
    }
    assert_eq!(lines, 4 * 50);
}
