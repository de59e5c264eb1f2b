use std::collections::{HashSet, VecDeque};

use crate::vision::types::DetectionSample;

/// Debounced verdict over the trailing detection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothedStatus {
    Working,
    Distracted,
}

/// Majority-vote smoothing over the last few labeled detections.
///
/// With the default window of 5, at least `len - 1` samples must carry a
/// non-working label before the status flips to `Distracted`; a single
/// misclassified frame cannot trigger a reminder. Frames with nobody in
/// them, and low-confidence labels, never enter the window.
#[derive(Debug)]
pub struct StatusFilter {
    history: VecDeque<String>,
    capacity: usize,
    min_confidence: f32,
    working_labels: HashSet<String>,
}

impl StatusFilter {
    pub fn new(
        capacity: usize,
        min_confidence: f32,
        working_labels: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            min_confidence,
            working_labels: working_labels.into_iter().collect(),
        }
    }

    /// Fold one raw sample into the window. Oldest label is evicted first
    /// once the window is full.
    pub fn observe(&mut self, sample: &DetectionSample) {
        if !sample.found || sample.confidence < self.min_confidence {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample.label.clone());
    }

    /// The debounced verdict. An empty window defaults to `Working`; the
    /// robot assumes on-task until it has evidence.
    pub fn current_status(&self) -> SmoothedStatus {
        if self.history.is_empty() {
            return SmoothedStatus::Working;
        }

        let distracted = self
            .history
            .iter()
            .filter(|label| !self.working_labels.contains(label.as_str()))
            .count();
        // `len - 1` degenerates to zero for a single-entry window, which
        // would flag a lone working sample; one distracted sample is the
        // floor for flipping.
        let threshold = (self.history.len() - 1).max(1);

        if distracted >= threshold {
            SmoothedStatus::Distracted
        } else {
            SmoothedStatus::Working
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}
