/// Maps byte offsets of one file's contents to 1-based lines and columns.
///
/// A line number is one plus the number of `\n` before the offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset where each line starts; always begins with 0
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(contents: impl AsRef<[u8]>) -> Self {
        let contents = contents.as_ref();
        let mut line_starts = vec![0];
        line_starts.extend(
            contents
                .iter()
                .enumerate()
                .filter(|(_, byte)| **byte == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: contents.len(),
        }
    }

    /// 1-based line of `offset`. Offsets past the end clamp to the end.
    pub fn line(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based byte column of `offset` within its line
    pub fn column(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        let line = self.line(offset);
        offset - self.line_starts[line - 1] + 1
    }
}
