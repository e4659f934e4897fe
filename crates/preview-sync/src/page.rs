//! Two-slot page buffer used to detect stable edits.
//!
//! Records the last two observed `(file, text)` pairs. A body injection is
//! only committed while both slots name the same file, which keeps a burst of
//! edits interleaved with a focus change from pushing the wrong document.
//! This is a heuristic: a same-file edit that lands and is overwritten within
//! one dispatch cycle is not detected.

/// One observed document state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub file: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct PageBuffer {
    current: PageSnapshot,
    previous: PageSnapshot,
}

impl PageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift `current` into `previous` and record the new state.
    ///
    /// No-op when either argument is empty.
    pub fn update(&mut self, file: &str, text: &str) {
        if file.is_empty() || text.is_empty() {
            return;
        }

        self.previous = std::mem::replace(
            &mut self.current,
            PageSnapshot {
                file: file.to_string(),
                text: text.to_string(),
            },
        );
    }

    /// Both slots name the same file.
    pub fn is_stable(&self) -> bool {
        self.current.file == self.previous.file
    }

    pub fn current(&self) -> &PageSnapshot {
        &self.current
    }

    pub fn previous(&self) -> &PageSnapshot {
        &self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_is_stable() {
        let mut page = PageBuffer::new();
        page.update("f1", "x");
        page.update("f1", "y");
        assert!(page.is_stable());
        assert_eq!(page.current().text, "y");
        assert_eq!(page.previous().text, "x");
    }

    #[test]
    fn test_file_switch_is_unstable() {
        let mut page = PageBuffer::new();
        page.update("f1", "x");
        page.update("f2", "y");
        assert!(!page.is_stable());
    }

    #[test]
    fn test_first_update_is_unstable() {
        let mut page = PageBuffer::new();
        page.update("f1", "x");
        assert!(!page.is_stable());
    }

    #[test]
    fn test_empty_arguments_are_ignored() {
        let mut page = PageBuffer::new();
        page.update("f1", "x");
        page.update("", "y");
        page.update("f2", "");
        assert_eq!(page.current().file, "f1");
        assert_eq!(page.previous(), &PageSnapshot::default());
    }

    #[test]
    fn test_new_buffer_starts_empty() {
        let page = PageBuffer::new();
        assert_eq!(page.current(), &PageSnapshot::default());
        assert!(page.is_stable());
    }
}
