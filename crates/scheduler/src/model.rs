use adweave_core_types::TaskId;
use tokio::sync::oneshot;

/// Lane a task enters the queue at. Scan passes run at `Background`: they
/// yield to input handling and rendering work but are never starved outright
/// thanks to the weighted round-robin drain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Priority {
    Input,
    Render,
    Background,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Input, Priority::Render, Priority::Background];

    pub fn weight(self) -> u8 {
        match self {
            Priority::Input => 8,
            Priority::Render => 4,
            Priority::Background => 1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Priority::Input => 0,
            Priority::Render => 1,
            Priority::Background => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub weights: [u8; 3],
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            weights: [
                Priority::Input.weight(),
                Priority::Render.weight(),
                Priority::Background.weight(),
            ],
        }
    }
}

/// Handle returned by `enqueue`. The receiver resolves once the task has run
/// to completion; dropping the handle does not cancel the task.
pub struct ScheduledTask {
    pub id: TaskId,
    pub done: oneshot::Receiver<()>,
}

impl ScheduledTask {
    /// Await completion of the scheduled task.
    pub async fn wait(self) {
        let _ = self.done.await;
    }
}
