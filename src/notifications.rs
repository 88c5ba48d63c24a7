//! Desktop notifications for engine notices.
//! Only macOS is implemented; other platforms are a no-op.

#[cfg(target_os = "macos")]
use std::process::Command;

use crate::domain::{FocusPhase, PhaseChange};
use crate::engine::Notice;

fn send(title: &str, body: &str) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            body.replace('"', "\\\""),
            title.replace('"', "\\\"")
        );

        if let Err(e) = Command::new("osascript").arg("-e").arg(&script).output() {
            tracing::debug!(error = %e, "notification not delivered");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        let _ = (title, body);
    }
}

/// Notification text for a phase change
pub fn phase_message(task_title: &str, change: &PhaseChange) -> String {
    let next = match change.to {
        FocusPhase::Work => "Back to work",
        FocusPhase::ShortBreak => "Time for a short break",
        FocusPhase::LongBreak => "Time for a long break",
        FocusPhase::Completed => "Session complete",
    };
    if change.awaiting_ack {
        format!("{}: {} (press Enter to start)", task_title, next)
    } else {
        format!("{}: {}", task_title, next)
    }
}

pub fn notify_phase_finished(task_title: &str, change: &PhaseChange) {
    send(
        &format!("Focusboard - {} finished", change.from.name()),
        &phase_message(task_title, change),
    );
}

pub fn notify_task_done(task_title: &str) {
    send("Focusboard - Task Completed", task_title);
}

pub fn notify(notice: &Notice) {
    match notice {
        Notice::PhaseChanged { task_title, change } => notify_phase_finished(task_title, change),
        Notice::TaskCompleted { title } => notify_task_done(title),
        // Shown in the status bar instead
        Notice::WipExceeded(_) => {}
    }
}
