use crate::models::Book;

/// List state for the search-results view: the query that produced the
/// results plus the current selection.
pub(crate) struct SearchScreen {
    pub(crate) query: String,
    pub(crate) results: Vec<Book>,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn new(query: String, results: Vec<Book>) -> Self {
        Self {
            query,
            results,
            selected: 0,
        }
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.results.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.results.is_empty() {
            return;
        }
        let len = self.results.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.results.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.results.is_empty() {
            self.selected = self.results.len() - 1;
        }
    }

    /// Replace the result set after a store mutation (a toggle or removal)
    /// re-ran the same query, keeping the selection in bounds.
    pub(crate) fn set_results(&mut self, results: Vec<Book>) {
        self.results = results;
        if self.results.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.results.len() {
            self.selected = self.results.len() - 1;
        }
    }
}
