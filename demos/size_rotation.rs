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

//! An example of logging to a file rotated by size.

use std::num::NonZeroU64;

use log::LevelFilter;
use sizeroll::Rotator;
use sizeroll::bridge::RotatingFileLogger;

fn main() {
    std::fs::create_dir_all("logs").unwrap();

    let rotator = Rotator::builder("logs/my_app.log")
        .rotation_size(NonZeroU64::new(4096).unwrap())
        .max_rotation(5)
        .build()
        .unwrap();

    RotatingFileLogger::new(rotator)
        .level(LevelFilter::Debug)
        .apply();

    for i in 0..100 {
        log::error!("Hello error! {i}");
        log::warn!("Hello warn! {i}");
        log::info!("Hello info! {i}");
        log::debug!("Hello debug! {i}");
        log::trace!("Hello trace! {i}");
    }

    log::logger().flush();
}
