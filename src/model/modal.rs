//! Modal stack for managing overlays
//!
//! Only the top modal receives input; modals are drawn bottom to top.

use super::table::RowActivation;

/// An overlay displayed on top of the market table
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Details of an activated row
    CoinDetail { activation: RowActivation },
    /// Page size selection
    PageSize { selected_index: usize },
    /// Keyboard shortcuts
    Help,
}

/// A stack of modal overlays
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coin::CoinId;

    fn activation() -> RowActivation {
        RowActivation {
            id: CoinId::Numeric(1),
            name: "Bitcoin".to_string(),
            source_index: 0,
            detail_url: "https://coinmarketcap.com/currencies/bitcoin/".to_string(),
        }
    }

    #[test]
    fn test_detail_stacks_over_quit() {
        let mut stack = ModalStack::new();
        assert!(stack.is_empty());

        stack.push(Modal::QuitConfirm);
        stack.push(Modal::CoinDetail {
            activation: activation(),
        });

        assert!(matches!(stack.top(), Some(Modal::CoinDetail { .. })));
        stack.pop();
        assert_eq!(stack.top(), Some(&Modal::QuitConfirm));
        stack.pop();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_page_size_selection_is_mutable_in_place() {
        let mut stack = ModalStack::new();
        stack.push(Modal::PageSize { selected_index: 0 });

        if let Some(Modal::PageSize { selected_index }) = stack.top_mut() {
            *selected_index = 2;
        }

        assert_eq!(stack.top(), Some(&Modal::PageSize { selected_index: 2 }));
    }
}
