//! Recursive character chunking.
//!
//! Splits on structure first (markdown headings, blank lines) and only
//! falls back to sentence punctuation and hard cuts for oversized runs.
//! Sizes are in characters, not bytes, so CJK text budgets correctly.

/// Split points in preference order. A separator stays attached to the
/// front of the piece that follows it.
pub const SEPARATORS: [&str; 6] = ["\n## ", "\n### ", "\n\n", "\n", "。", "；"];

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces = self.split_recursive(text, &SEPARATORS);
        self.merge(pieces)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        for (i, sep) in separators.iter().enumerate() {
            if !text.contains(sep) {
                continue;
            }
            let mut out = Vec::new();
            for part in split_keep_separator(text, sep) {
                if char_len(&part) > self.chunk_size {
                    out.extend(self.split_recursive(&part, &separators[i + 1..]));
                } else {
                    out.push(part);
                }
            }
            return out;
        }

        self.hard_split(text)
    }

    /// No separator left: cut on character windows.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = (self.chunk_size - self.chunk_overlap).max(1);
        let mut out = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        out
    }

    /// Greedily pack pieces into chunks up to `chunk_size`, carrying the
    /// trailing pieces of each flushed chunk forward as overlap.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if current_len + piece_len > self.chunk_size && !current.is_empty() {
                push_chunk(&mut chunks, &current);
                while current_len > self.chunk_overlap
                    || (current_len + piece_len > self.chunk_size && !current.is_empty())
                {
                    let removed = current.remove(0);
                    current_len -= char_len(&removed);
                }
            }
            current_len += piece_len;
            current.push(piece);
        }

        push_chunk(&mut chunks, &current);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, pieces: &[String]) {
    let chunk = pieces.concat();
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` at `sep`, attaching each separator occurrence to the piece
/// that follows it.
fn split_keep_separator(text: &str, sep: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(sep) {
        if idx > last {
            pieces.push(text[last..idx].to_string());
        }
        last = idx;
    }
    if last < text.len() {
        pieces.push(text[last..].to_string());
    }
    pieces
}
