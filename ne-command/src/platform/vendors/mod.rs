//! Built-in vendor platforms.

pub mod huawei_vrp;
