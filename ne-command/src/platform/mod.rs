//! Platform definitions.
//!
//! A platform bundles the prompt pattern, paging setup and error strings of
//! a device family. Huawei VRP is built in; other CLIs can be described with
//! [`PlatformDefinition`] directly.

mod definition;
pub mod vendors;

pub use definition::PlatformDefinition;

/// Look up a built-in platform by name.
pub fn builtin(name: &str) -> Option<PlatformDefinition> {
    match name {
        vendors::huawei_vrp::PLATFORM_NAME => Some(vendors::huawei_vrp::platform()),
        _ => None,
    }
}
