use std::collections::VecDeque;

use hybridrag_core::types::Turn;

/// Last `capacity` exchanges of one chat session, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    capacity: usize,
    /// Kept contiguous after every push so `turns` can lend a slice.
    turns: VecDeque<Turn>,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, turns: VecDeque::with_capacity(capacity) }
    }

    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn { question: question.into(), answer: answer.into() });
        self.turns.make_contiguous();
    }

    pub fn turns(&self) -> &[Turn] {
        self.turns.as_slices().0
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
