/// Append-only text buffer for one encode call.
///
/// Content that is only known after the traversal (the shared type block) is
/// spliced in once at a remembered byte offset by [`JsonWriter::finish`].
pub struct JsonWriter {
    out: String,
    mark: Option<usize>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(256),
            mark: None,
        }
    }

    #[inline]
    pub fn push(&mut self, c: char) {
        self.out.push(c);
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Drops everything written after `len`. Cutting below the insertion
    /// point clears it so the next mark takes its place.
    pub fn truncate(&mut self, len: usize) {
        if self.mark.is_some_and(|at| at > len) {
            self.mark = None;
        }
        self.out.truncate(len);
    }

    /// Remembers the current offset as the insertion point. Only the first call counts.
    pub fn mark_insertion_point(&mut self) {
        if self.mark.is_none() {
            self.mark = Some(self.out.len());
        }
    }

    pub fn insertion_point(&self) -> Option<usize> {
        self.mark
    }

    /// Direct access for formatters that append in place.
    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.out
    }

    /// Returns the text with `block` spliced in at the insertion point (prefix + block + suffix).
    pub fn finish(self, block: Option<&str>) -> String {
        match (self.mark, block) {
            (Some(at), Some(block)) if !block.is_empty() => {
                let mut s = String::with_capacity(self.out.len() + block.len());
                s.push_str(&self.out[..at]);
                s.push_str(block);
                s.push_str(&self.out[at..]);
                s
            }
            _ => self.out,
        }
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splices_block_at_first_mark() {
        let mut w = JsonWriter::new();
        w.push('{');
        w.mark_insertion_point();
        w.push_str("\"a\":{");
        w.mark_insertion_point();
        w.push_str("}}");
        assert_eq!(w.finish(Some("X,")), "{X,\"a\":{}}");
    }

    #[test]
    fn truncating_past_the_mark_releases_it() {
        let mut w = JsonWriter::new();
        w.push('[');
        w.mark_insertion_point();
        w.push_str("{}");
        w.truncate(0);
        w.push_str("[1,{");
        w.mark_insertion_point();
        w.push_str("}]");
        assert_eq!(w.insertion_point(), Some(4));
        assert_eq!(w.finish(Some("X")), "[1,{X}]");
    }

    #[test]
    fn no_mark_returns_text_unchanged() {
        let mut w = JsonWriter::new();
        w.push_str("[]");
        assert_eq!(w.finish(Some("X")), "[]");
    }
}
