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

//! Size-triggered rotation of a single log file.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroU64;
//!
//! use sizeroll::Rotator;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("app.log");
//!
//! let mut rotator = Rotator::builder(&path)
//!     .rotation_size(NonZeroU64::new(10).unwrap())
//!     .max_rotation(3)
//!     .build()
//!     .unwrap();
//!
//! rotator.write_str("0123456789").unwrap();
//! rotator.write_str("0123456789").unwrap();
//!
//! assert!(rotator.backup_path(1).exists());
//! rotator.close().unwrap();
//! ```

pub use self::writer::DEFAULT_ROTATION_SIZE;
pub use self::writer::Rotator;
pub use self::writer::RotatorBuilder;

mod backup;
mod writer;
