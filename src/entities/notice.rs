use serde::{Deserialize, Serialize};

/// Seconds a success banner stays visible.
pub const SUCCESS_DISMISS_SECS: u64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Alert,
}

/// User-facing outcome of a write action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub dismiss_after_secs: Option<u64>,
}

impl Notice {
    pub fn success(message: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            dismiss_after_secs: Some(SUCCESS_DISMISS_SECS),
        }
    }

    /// Blocking notice; stays until the user dismisses it.
    pub fn alert(message: &str) -> Self {
        Self {
            kind: NoticeKind::Alert,
            message: message.into(),
            dismiss_after_secs: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

#[test]
fn notice_dismissal_test() {
    let success = Notice::success("saved");
    assert!(success.is_success());
    assert_eq!(success.dismiss_after_secs, Some(3));

    let alert = Notice::alert("failed");
    assert!(!alert.is_success());
    assert_eq!(alert.dismiss_after_secs, None);
}
