use serde::Serialize;

use crate::models::idea::{Idea, IdeaPriority};

/// The dashboard's grouping of ideas by priority tier.
///
/// Derived from a full listing on every read, never stored. Each column keeps
/// the listing's order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PriorityBoard {
    pub unprioritized: Vec<Idea>,
    pub high: Vec<Idea>,
    pub medium: Vec<Idea>,
    pub low: Vec<Idea>,
}

impl PriorityBoard {
    pub fn from_ideas(ideas: impl IntoIterator<Item = Idea>) -> Self {
        let mut board = Self::default();
        for idea in ideas {
            board.column_mut(idea.priority).push(idea);
        }
        board
    }

    pub fn column(&self, priority: IdeaPriority) -> &[Idea] {
        match priority {
            IdeaPriority::Unset => &self.unprioritized,
            IdeaPriority::High => &self.high,
            IdeaPriority::Medium => &self.medium,
            IdeaPriority::Low => &self.low,
        }
    }

    fn column_mut(&mut self, priority: IdeaPriority) -> &mut Vec<Idea> {
        match priority {
            IdeaPriority::Unset => &mut self.unprioritized,
            IdeaPriority::High => &mut self.high,
            IdeaPriority::Medium => &mut self.medium,
            IdeaPriority::Low => &mut self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.unprioritized.len() + self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
