//! Transient notifications.
//!
//! A toast is appended hidden, revealed after a short delay so the CSS
//! transition has something to animate, hidden again after the display
//! duration and finally removed once the hide transition ends. Toasts
//! are independent; nothing is deduplicated or queued.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Shown,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub kind: ToastKind,
    pub phase: ToastPhase,
}

/// Timer the front-end must arm for a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTimer {
    Reveal { id: Uuid, after: Duration },
    Expire { id: Uuid, after: Duration },
    Remove { id: Uuid, after: Duration },
}

/// Fallback for removal when no `transitionend` arrives.
pub const HIDE_TRANSITION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastCenter {
    toasts: Vec<Toast>,
    show_delay: Duration,
    display: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(3_000))
    }
}

impl ToastCenter {
    pub fn new(show_delay: Duration, display: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            show_delay,
            display,
        }
    }

    /// Appends a toast and returns the timers that drive its lifetime.
    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind) -> [ToastTimer; 2] {
        let id = Uuid::new_v4();
        let message = message.into();
        debug!(%id, ?kind, message = %message, "toast");
        self.toasts.push(Toast {
            id,
            message,
            kind,
            phase: ToastPhase::Entering,
        });

        [
            ToastTimer::Reveal {
                id,
                after: self.show_delay,
            },
            ToastTimer::Expire {
                id,
                after: self.display,
            },
        ]
    }

    pub fn reveal(&mut self, id: Uuid) {
        if let Some(toast) = self.find_mut(id)
            && toast.phase == ToastPhase::Entering
        {
            toast.phase = ToastPhase::Shown;
        }
    }

    /// Starts the hide transition.
    pub fn expire(&mut self, id: Uuid) -> Option<ToastTimer> {
        let toast = self.find_mut(id)?;
        toast.phase = ToastPhase::Leaving;
        Some(ToastTimer::Remove {
            id,
            after: HIDE_TRANSITION,
        })
    }

    /// Called once the hide transition has finished.
    pub fn remove(&mut self, id: Uuid) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Takes every toast at once, for front-ends without timers.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Toast> {
        self.toasts.iter_mut().find(|toast| toast.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_lifecycle_follows_its_timers() {
        let mut center = ToastCenter::default();
        let [reveal, expire] = center.notify("Task created successfully!", ToastKind::Success);

        let ToastTimer::Reveal { id, after } = reveal else {
            panic!("first timer reveals");
        };
        assert_eq!(after, Duration::from_millis(100));
        assert_eq!(
            expire,
            ToastTimer::Expire {
                id,
                after: Duration::from_millis(3_000)
            }
        );
        assert_eq!(center.toasts()[0].phase, ToastPhase::Entering);

        center.reveal(id);
        assert_eq!(center.toasts()[0].phase, ToastPhase::Shown);
        assert_eq!(
            center.expire(id),
            Some(ToastTimer::Remove {
                id,
                after: HIDE_TRANSITION
            })
        );
        assert_eq!(center.toasts()[0].phase, ToastPhase::Leaving);
        center.reveal(id);
        assert_eq!(center.toasts()[0].phase, ToastPhase::Leaving);
        center.remove(id);
        assert!(center.toasts().is_empty());
        assert_eq!(center.expire(id), None);
    }

    #[test]
    fn concurrent_toasts_stack_independently() {
        let mut center = ToastCenter::default();
        let [ToastTimer::Reveal { id: first, .. }, _] = center.notify("same", ToastKind::Error)
        else {
            panic!("reveal timer first");
        };
        center.notify("same", ToastKind::Error);
        assert_eq!(center.toasts().len(), 2);

        center.remove(first);
        assert_eq!(center.toasts().len(), 1);
        assert_eq!(center.toasts()[0].message, "same");
        assert_eq!(center.toasts()[0].kind.css_class(), "error");
    }

    #[test]
    fn drain_empties_the_stack() {
        let mut center = ToastCenter::default();
        center.notify("one", ToastKind::Success);
        center.notify("two", ToastKind::Error);
        let drained = center.drain();
        assert_eq!(drained.len(), 2);
        assert!(center.toasts().is_empty());
    }
}
