use std::collections::VecDeque;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use adweave_core_types::TaskId;

use crate::model::Priority;

pub struct Job {
    pub id: TaskId,
    pub priority: Priority,
    pub seq: u64,
    pub task: BoxFuture<'static, ()>,
    pub done: Option<oneshot::Sender<()>>,
}

impl Job {
    pub fn new(
        priority: Priority,
        seq: u64,
        task: BoxFuture<'static, ()>,
        done: oneshot::Sender<()>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            priority,
            seq,
            task,
            done: Some(done),
        }
    }
}

/// Deficit-weighted round-robin over the three priority lanes. Within a lane
/// tasks drain in enqueue order, so scan passes scheduled by successive
/// mutation signals run in signal order.
pub struct TaskLane {
    queues: [VecDeque<Job>; 3],
    weights: [u8; 3],
    deficits: [i32; 3],
    cursor: usize,
}

impl TaskLane {
    pub fn new(weights: [u8; 3]) -> Self {
        Self {
            queues: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
            weights,
            deficits: [0; 3],
            cursor: 0,
        }
    }

    pub fn push(&mut self, job: Job) {
        self.queues[job.priority.index()].push_back(job);
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    pub fn pop(&mut self) -> Option<Job> {
        for _ in 0..Priority::ALL.len() * 2 {
            let idx = self.cursor;
            self.deficits[idx] += self.weights[idx] as i32;
            let job = self.try_consume(idx);
            self.cursor = (idx + 1) % Priority::ALL.len();
            if job.is_some() {
                return job;
            }
        }
        None
    }

    pub fn len_by_priority(&self) -> [usize; 3] {
        let mut lengths = [0usize; 3];
        for (idx, queue) in self.queues.iter().enumerate() {
            lengths[idx] = queue.len();
        }
        lengths
    }

    fn try_consume(&mut self, idx: usize) -> Option<Job> {
        if self.queues[idx].is_empty() {
            return None;
        }
        if self.deficits[idx] <= 0 {
            return None;
        }
        self.deficits[idx] -= 1;
        self.queues[idx].pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(priority: Priority, seq: u64) -> Job {
        let (tx, _rx) = oneshot::channel();
        Job::new(priority, seq, Box::pin(async {}), tx)
    }

    #[test]
    fn weighted_round_robin_prefers_input() {
        let mut lane = TaskLane::new([8, 4, 1]);

        for i in 0..4 {
            lane.push(job(Priority::Background, i));
        }
        for i in 0..4 {
            lane.push(job(Priority::Render, 100 + i));
        }
        for i in 0..4 {
            lane.push(job(Priority::Input, 200 + i));
        }

        let mut counts = [0usize; 3];
        for _ in 0..8 {
            if let Some(popped) = lane.pop() {
                counts[popped.priority.index()] += 1;
            }
        }

        assert!(counts[Priority::Input.index()] >= counts[Priority::Render.index()]);
        assert!(counts[Priority::Render.index()] >= counts[Priority::Background.index()]);
        assert!(counts[Priority::Input.index()] > 0);
    }

    #[test]
    fn drain_all_jobs() {
        let mut lane = TaskLane::new([8, 4, 1]);

        let mut seq = 0;
        for priority in Priority::ALL.into_iter() {
            lane.push(job(priority, seq));
            seq += 1;
        }

        let mut popped = Vec::new();
        while let Some(entry) = lane.pop() {
            popped.push(entry.seq);
        }

        assert_eq!(popped.len(), Priority::ALL.len());
        assert!(lane.is_empty());
    }

    #[test]
    fn same_lane_keeps_enqueue_order() {
        let mut lane = TaskLane::new([8, 4, 1]);
        for i in 0..5 {
            lane.push(job(Priority::Background, i));
        }

        let mut seqs = Vec::new();
        while let Some(entry) = lane.pop() {
            seqs.push(entry.seq);
        }
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }
}
