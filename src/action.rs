//! Action enum - All possible application actions
//!
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::SortColumn;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick, also drives fetch polling
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Row Cursor
    // ─────────────────────────────────────────────────────────────────────────
    NextRow,
    PrevRow,
    FirstRow,
    LastRow,

    // ─────────────────────────────────────────────────────────────────────────
    // Table
    // ─────────────────────────────────────────────────────────────────────────
    NextPage,
    PrevPage,
    /// Sort by a column, flipping direction if already sorted by it
    SortBy(SortColumn),
    /// Sort by the Nth visible column (1-based)
    SortByPosition(usize),
    NextPageSize,
    PrevPageSize,
    /// Activate the row at a window position
    ActivateRow(usize),
    /// Activate the row under the cursor
    ActivateSelected,
    /// Refetch the listing
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    OpenPageSizeDialog,
    /// Open the detail page of the shown coin in a browser
    OpenInBrowser,
    CloseModal,
    ConfirmModal,
    ModalUp,
    ModalDown,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextRow => write!(f, "NextRow"),
            Action::PrevRow => write!(f, "PrevRow"),
            Action::FirstRow => write!(f, "FirstRow"),
            Action::LastRow => write!(f, "LastRow"),
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::SortBy(column) => write!(f, "SortBy({})", column),
            Action::SortByPosition(n) => write!(f, "SortByPosition({})", n),
            Action::NextPageSize => write!(f, "NextPageSize"),
            Action::PrevPageSize => write!(f, "PrevPageSize"),
            Action::ActivateRow(position) => write!(f, "ActivateRow({})", position),
            Action::ActivateSelected => write!(f, "ActivateSelected"),
            Action::Refresh => write!(f, "Refresh"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenPageSizeDialog => write!(f, "OpenPageSizeDialog"),
            Action::OpenInBrowser => write!(f, "OpenInBrowser"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
        }
    }
}
