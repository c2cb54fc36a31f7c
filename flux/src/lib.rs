#![allow(clippy::new_without_default)]

pub mod duration;
pub mod logging;
pub mod time;
pub mod util;
