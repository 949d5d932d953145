//! Bandwidth group view.

use crate::constants::Priority;
use crate::fields::{accessors, view};

view! {
    /// A bandwidth group as returned by `group-get`.
    Group
}

accessors!(Group {
    name: str = "name",
    honors_session_limits: bool = "honorsSessionLimits",
    speed_limit_down_enabled: bool = "speed-limit-down-enabled",
    speed_limit_down: int = "speed-limit-down",
    speed_limit_up_enabled: bool = "speed-limit-up-enabled",
    speed_limit_up: int = "speed-limit-up",
});

impl Group {
    /// Bandwidth priority of the group.
    pub fn bandwidth_priority(&self) -> Option<Priority> {
        self.fields
            .int("bandwidthPriority")
            .and_then(Priority::from_value)
    }
}
