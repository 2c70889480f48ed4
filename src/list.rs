use std::collections::BTreeSet;

/// One entry on the shopping list. The text is fixed once created; only the
/// checked flag changes in response to user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    pub checked: bool,
}

/// Input alphabet of the list controller. Terminal events that map to none
/// of these are dropped before they reach [`ListState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveUp,
    MoveDown,
    Toggle,
    Quit,
}

/// Whether the event loop should keep running after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The in-memory list plus cursor and selection. Mutated only through
/// [`ListState::apply`]; the cursor stays within `0..items.len()` (pinned at
/// 0 for an empty list) and the selection only ever holds valid indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    items: Vec<Item>,
    cursor: usize,
    selection: BTreeSet<usize>,
}

impl ListState {
    /// Build the state from stored items, deriving the selection from each
    /// item's checked flag.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        let selection = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.checked)
            .map(|(index, _)| index)
            .collect();
        Self {
            items,
            cursor: 0,
            selection,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    /// Apply one input event, returning the next state and whether the loop
    /// should continue. The transition is total over [`InputEvent`] and has
    /// no side effects.
    #[must_use]
    pub fn apply(mut self, event: InputEvent) -> (Self, Flow) {
        match event {
            InputEvent::MoveDown => {
                if !self.items.is_empty() {
                    self.cursor = (self.cursor + 1).min(self.items.len() - 1);
                }
            }
            InputEvent::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            InputEvent::Toggle => {
                if !self.items.is_empty() && !self.selection.remove(&self.cursor) {
                    self.selection.insert(self.cursor);
                }
            }
            InputEvent::Quit => return (self, Flow::Quit),
        }
        (self, Flow::Continue)
    }

    /// Consume the state, writing the selection back into the items' checked
    /// flags for persistence.
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        let selection = self.selection;
        self.items
            .into_iter()
            .enumerate()
            .map(|(index, item)| Item {
                checked: selection.contains(&index),
                ..item
            })
            .collect()
    }
}
