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

//! Sizeroll is a size-triggered log file rotator.
//!
//! # Overview
//!
//! A [`Rotator`] appends data to a target file. Once the file would grow past the configured
//! rotation size, the file is renamed into a numbered backup slot and a fresh file is started at
//! the original path:
//!
//! ```text
//! app.log      the active file
//! app.log.1    the most recently rotated-out content
//! app.log.2    older content
//! ...
//! ```
//!
//! The number of backups can be capped. Reaching the cap is an error of kind
//! [`ErrorKind::RotationExceeded`]; the rotator never deletes backups on its own.
//!
//! # Examples
//!
//! Write through a rotator directly:
//!
//! ```
//! use std::num::NonZeroU64;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut rotator = sizeroll::Rotator::open(dir.path().join("app.log")).unwrap();
//! rotator.set_rotation_size(NonZeroU64::new(1024).unwrap());
//! rotator.write_str("hello\n").unwrap();
//! rotator.close().unwrap();
//! ```
//!
//! Forward the `log` crate to a rotating file (requires the `bridge-log` feature):
//!
//! ```no_run
//! use sizeroll::Rotator;
//! use sizeroll::bridge::RotatingFileLogger;
//!
//! let rotator = Rotator::open("app.log").unwrap();
//! RotatingFileLogger::new(rotator).apply();
//!
//! log::info!("This log will be written to a rotating file.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod rotator;
pub mod trap;

#[cfg(feature = "bridge-log")]
pub mod bridge;

mod error;

pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::rotator::Rotator;
pub use self::rotator::RotatorBuilder;
pub use self::trap::Trap;
