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

use std::sync::Mutex;
use std::sync::MutexGuard;

use jiff::Zoned;
use jiff::tz::TimeZone;
use log::LevelFilter;

use crate::Error;
use crate::Rotator;
use crate::Trap;
use crate::trap::DefaultTrap;

/// A `log` crate logger that appends records to a [`Rotator`].
///
/// The rotator is guarded by a mutex held for the whole write, rotation included, so the logger
/// can be shared by every thread of the process.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR size_rotation: demos/size_rotation.rs:51 Hello error!
/// 2024-08-11T22:44:57.172219+08:00  WARN size_rotation: demos/size_rotation.rs:52 Hello warn!
/// 2024-08-11T22:44:57.172276+08:00  INFO size_rotation: demos/size_rotation.rs:53 Hello info!
/// ```
///
/// Errors, including [`ErrorKind::RotationExceeded`](crate::ErrorKind::RotationExceeded), are
/// sent to the configured [`Trap`] since [`log::Log`] cannot return them.
#[derive(Debug)]
pub struct RotatingFileLogger {
    rotator: Mutex<Rotator>,
    level: LevelFilter,
    tz: Option<TimeZone>,
    trap: Box<dyn Trap>,
}

impl RotatingFileLogger {
    /// Create a new logger writing through `rotator`.
    ///
    /// Default to level [`LevelFilter::Trace`], the system timezone, and [`DefaultTrap`].
    pub fn new(rotator: Rotator) -> Self {
        Self {
            rotator: Mutex::new(rotator),
            level: LevelFilter::Trace,
            tz: None,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the maximum level of records to write.
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Set the timezone of timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Set the trap for errors raised while writing records.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Consume the logger and return the rotator, e.g. to close it.
    pub fn into_inner(self) -> Rotator {
        self.rotator.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    /// Set up this logger as the log crate global logger.
    ///
    /// The global maximum log level is set to the level of this logger.
    ///
    /// # Errors
    ///
    /// Return an error if the log crate global logger has already been set.
    pub fn try_apply(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Set up this logger as the log crate global logger.
    ///
    /// # Panics
    ///
    /// Panic if the log crate global logger has already been set.
    pub fn apply(self) {
        self.try_apply().expect(
            "RotatingFileLogger::apply must be called before the log crate global logger initialized",
        )
    }

    fn rotator(&self) -> MutexGuard<'_, Rotator> {
        self.rotator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn format(&self, record: &log::Record) -> String {
        let time = match self.tz.clone() {
            Some(tz) => Zoned::now().with_time_zone(tz),
            None => Zoned::now(),
        }
        .strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = record.level();
        let module = record.module_path().unwrap_or_default();
        let file = record.file().unwrap_or_default();
        let line = record.line().unwrap_or_default();
        let message = record.args();

        format!("{time} {level:>5} {module}: {file}:{line} {message}\n")
    }
}

impl log::Log for RotatingFileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format(record);
        if let Err(err) = self.rotator().write(line.as_bytes()) {
            self.trap.trap(&err);
        }
    }

    fn flush(&self) {
        if let Err(err) = self.rotator().flush() {
            let err = Error::new(err.kind(), "failed to flush rotating file logger")
                .with_source(err);
            self.trap.trap(&err);
        }
    }
}
