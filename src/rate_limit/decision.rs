use super::limits::Window;

const BURST_MESSAGE: &str = "Too many requests in a short time. Please slow down your requests.";
const HIGH_LOAD_MESSAGE: &str =
    "I'm currently experiencing high load. Please try again in a few moments.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Window(Window),
    Burst,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Window(window) => window.name(),
            DenyReason::Burst => "burst",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Denied { reason: DenyReason, message: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Admitted)
    }

    // empty when admitted
    pub fn message(&self) -> &str {
        match self {
            Decision::Admitted => "",
            Decision::Denied { message, .. } => message,
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Admitted => None,
            Decision::Denied { reason, .. } => Some(*reason),
        }
    }

    pub(crate) fn window(window: Window, limit: u32, high_load: bool) -> Self {
        Decision::Denied {
            reason: DenyReason::Window(window),
            message: window_message(window, limit, high_load),
        }
    }

    pub(crate) fn burst() -> Self {
        Decision::Denied { reason: DenyReason::Burst, message: BURST_MESSAGE.to_string() }
    }
}

// Under high load the ceiling is not disclosed
pub fn window_message(window: Window, limit: u32, high_load: bool) -> String {
    if high_load {
        HIGH_LOAD_MESSAGE.to_string()
    } else {
        format!(
            "Rate limit exceeded. You can make up to {limit} requests per {}. \
             Please wait before making more requests.",
            window.name()
        )
    }
}
