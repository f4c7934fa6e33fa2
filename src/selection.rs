//! Shelf/gallery selection state machine.
//!
//! ```text
//! Shelf --select(b)--> Gallery(b, 0, unlocked) --close--> Shelf (+ animating out)
//!                        |  next / previous (unlocked only, clamped)
//!                        |  toggle_inspect
//! ```
//!
//! Every transition is synchronous and returns whether it changed anything.
//! Transitions that are not valid in the current state are no-ops.

use log::debug;

/// Which book is open, which image is current and whether it is locked for
/// inspection.
///
/// `inspect_locked` is only ever set while a book is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    selected_book: Option<usize>,
    current_image: usize,
    inspect_locked: bool,
}

impl SelectionState {
    pub fn selected_book(&self) -> Option<usize> {
        self.selected_book
    }

    pub fn current_image(&self) -> usize {
        self.current_image
    }

    pub fn inspect_locked(&self) -> bool {
        self.inspect_locked
    }

    pub fn phase(&self) -> Phase {
        match self.selected_book {
            None => Phase::Shelf,
            Some(book) => Phase::Gallery {
                book,
                image: self.current_image,
                inspect_locked: self.inspect_locked,
            },
        }
    }
}

/// The two top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Shelf,
    Gallery {
        book: usize,
        image: usize,
        inspect_locked: bool,
    },
}

/// A gallery that has been closed but is still fading out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingView {
    pub book: usize,
    pub image: usize,
    pub inspect_locked: bool,
}

/// Owner of [`SelectionState`]; the only way to mutate it.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: SelectionState,
    book_count: usize,
    item_count: usize,
    /// Set while the open gallery's items are being re-resolved; moves wait
    /// for the next `set_item_count`.
    items_stale: bool,
    closing: Option<ClosingView>,
}

impl SelectionMachine {
    /// Start on the shelf with `book_count` selectable books.
    pub fn new(book_count: usize) -> Self {
        Self {
            book_count,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn book_count(&self) -> usize {
        self.book_count
    }

    /// Update the shelf size, e.g. after a content reload. Applies to
    /// future selections only.
    pub fn set_book_count(&mut self, book_count: usize) {
        self.book_count = book_count;
    }

    /// Images in the open gallery; 0 until its layout is known.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Record how many images the open gallery holds, pulling the current
    /// index back into range. Ignored on the shelf.
    pub fn set_item_count(&mut self, item_count: usize) {
        if self.state.selected_book.is_none() {
            return;
        }
        self.item_count = item_count;
        self.items_stale = false;
        let max = item_count.saturating_sub(1);
        if self.state.current_image > max {
            debug!("clamping image {} to {}", self.state.current_image, max);
            self.state.current_image = max;
        }
    }

    /// Mark the item count as out of date, e.g. while a rebuilt gallery is
    /// loading. The current index is kept; next/previous are refused until
    /// [`set_item_count`](SelectionMachine::set_item_count) runs again.
    pub fn invalidate_item_count(&mut self) {
        if self.state.selected_book.is_some() {
            self.items_stale = true;
        }
    }

    /// Whether a closed gallery should still be drawn.
    pub fn is_animating_out(&self) -> bool {
        self.closing.is_some()
    }

    pub fn closing(&self) -> Option<ClosingView> {
        self.closing
    }

    /// Whether next/previous would be accepted (ignoring boundaries).
    pub fn can_navigate(&self) -> bool {
        self.state.selected_book.is_some() && !self.state.inspect_locked && !self.items_stale
    }

    /// Open `book`. Only valid on the shelf; supersedes a running close.
    pub fn select(&mut self, book: usize) -> bool {
        if let Some(current) = self.state.selected_book {
            debug!("select({}) ignored: book {} already open", book, current);
            return false;
        }
        if book >= self.book_count {
            debug!("select({}) ignored: shelf has {} books", book, self.book_count);
            return false;
        }
        if let Some(closing) = self.closing.take() {
            debug!("select({}) supersedes close of book {}", book, closing.book);
        }
        self.state = SelectionState {
            selected_book: Some(book),
            current_image: 0,
            inspect_locked: false,
        };
        self.item_count = 0;
        self.items_stale = false;
        true
    }

    /// Advance to the next image. No-op at the last image or while locked.
    pub fn next(&mut self) -> bool {
        if !self.can_navigate() {
            debug!("next ignored in {:?}", self.phase());
            return false;
        }
        if self.state.current_image + 1 >= self.item_count {
            return false;
        }
        self.state.current_image += 1;
        true
    }

    /// Go back one image. No-op at the first image or while locked.
    pub fn previous(&mut self) -> bool {
        if !self.can_navigate() {
            debug!("previous ignored in {:?}", self.phase());
            return false;
        }
        if self.state.current_image == 0 {
            return false;
        }
        self.state.current_image -= 1;
        true
    }

    /// Lock or unlock the current image for inspection.
    pub fn toggle_inspect(&mut self) -> bool {
        if self.state.selected_book.is_none() {
            debug!("toggle_inspect ignored on the shelf");
            return false;
        }
        self.state.inspect_locked = !self.state.inspect_locked;
        true
    }

    /// Return to the shelf. The closed gallery stays [animating out]
    /// until [`finish_close`] is called.
    ///
    /// [animating out]: SelectionMachine::is_animating_out
    /// [`finish_close`]: SelectionMachine::finish_close
    pub fn close(&mut self) -> bool {
        let Some(book) = self.state.selected_book else {
            debug!("close ignored on the shelf");
            return false;
        };
        self.closing = Some(ClosingView {
            book,
            image: self.state.current_image,
            inspect_locked: self.state.inspect_locked,
        });
        self.state = SelectionState::default();
        self.item_count = 0;
        self.items_stale = false;
        true
    }

    /// Completion callback of the close animation.
    pub fn finish_close(&mut self) -> bool {
        self.closing.take().is_some()
    }
}
