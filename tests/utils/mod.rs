// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

pub mod canned_server;
pub mod fake_strategy;
pub mod helpers;
