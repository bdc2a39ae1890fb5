//! Huawei VRP platform definition.
//!
//! Covers NE/CX routers and CE/S switches running VRP 5 and VRP 8.
//!
//! # Prompt Examples
//!
//! ```text
//! <HUAWEI>                          # user view
//! [HUAWEI]                          # system view (VRP 5)
//! [~HUAWEI]                         # system view, two-stage commit (VRP 8)
//! [*HUAWEI-GigabitEthernet0/1/0]    # uncommitted changes in a sub-view
//! ```

use crate::platform::PlatformDefinition;

/// Platform name for Huawei VRP.
pub const PLATFORM_NAME: &str = "huawei_vrp";

/// Prompt in any view: `<host>` or `[host...]`, optionally `~`/`*` flagged.
const PROMPT_PATTERN: &str = r"(?m)^\s*(?:<[\w.\-@/:+]{1,63}>|\[[~*]?[\w.\-@/:+]{1,127}\])\s*$";

/// Create the Huawei VRP platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new(PLATFORM_NAME, PROMPT_PATTERN)
        .expect("static VRP prompt pattern")
        .with_failure_pattern("Error: ")
        .with_failure_pattern("% Error")
        .with_failure_pattern("Unrecognized command")
        .with_failure_pattern("Incomplete command")
        .with_failure_pattern("Ambiguous command")
        .with_failure_pattern("Too many parameters")
        .with_failure_pattern("Wrong parameter")
        .with_on_open_command("screen-length 0 temporary")
        .with_on_open_command("undo terminal monitor")
        .with_terminal_size(511, 24)
}
