//! Document chunking: split corpus text into overlapping, sentence-aligned
//! chunks for embedding.
//!
//! Units are sentences (split after `.`, `!` or `?` followed by whitespace)
//! or, when the text has no sentence boundary at all, blank-line separated
//! paragraphs. Units are never cut: a single unit longer than the target
//! size becomes its own oversized chunk. Each new chunk is seeded with the
//! trailing words of the previous one so a sentence pair straddling a
//! boundary stays retrievable from either side. All lengths are counted in
//! characters, not bytes.

use sanad_core::types::Chunk;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_OVERLAP: usize = 100;
pub const DEFAULT_SOURCE_NAME: &str = "source.txt";

/// Sentence-aware chunker with word-aligned overlap.
#[derive(Debug, Clone)]
pub struct Chunker {
    target_size: usize,
    overlap: usize,
    source_name: String,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP)
    }
}

impl Chunker {
    pub fn new(target_size: usize, overlap: usize) -> Self {
        Self {
            target_size: target_size.max(1),
            overlap,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Split `text` into ordered chunks. Empty or blank input yields none.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let (units, sep) = split_units(text);
        let sep_len = sep.chars().count();

        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0usize;

        for unit in &units {
            let unit_len = unit.chars().count();
            let join_len = if buffer.is_empty() { 0 } else { sep_len };

            if !buffer.is_empty() && buffer_len + join_len + unit_len > self.target_size {
                let sealed = std::mem::take(&mut buffer);
                self.seal(&sealed, &mut chunks);

                // Never let the carried-over words push an in-bounds unit
                // past the target size.
                let budget = self
                    .overlap
                    .min(self.target_size.saturating_sub(unit_len + sep_len));
                buffer = overlap_suffix(&sealed, budget);
                buffer_len = buffer.chars().count();
            }

            if !buffer.is_empty() {
                buffer.push_str(sep);
                buffer_len += sep_len;
            }
            buffer.push_str(unit);
            buffer_len += unit_len;
        }

        self.seal(&buffer, &mut chunks);

        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.total_chunks = total;
        }
        chunks
    }

    fn seal(&self, buffer: &str, chunks: &mut Vec<Chunk>) {
        let text = buffer.trim();
        if text.is_empty() {
            return;
        }
        let index = chunks.len();
        chunks.push(Chunk {
            id: format!("chunk_{index}"),
            text: text.to_string(),
            source_name: self.source_name.clone(),
            index,
            total_chunks: 0,
        });
    }
}

/// Chunk with default sizes and source name.
pub fn chunk_text(text: &str, target_size: usize, overlap: usize) -> Vec<Chunk> {
    Chunker::new(target_size, overlap).chunk(text)
}

/// Sentence units when the text has at least one sentence boundary,
/// otherwise paragraph units. Returns the units and the separator used to
/// re-join them.
fn split_units(text: &str) -> (Vec<String>, &'static str) {
    let sentences = split_sentences(text);
    if sentences.len() > 1 {
        return (sentences, " ");
    }
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        (sentences, " ")
    } else {
        (paragraphs, "\n\n")
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let boundary = matches!(chars.peek(), Some(&(_, next)) if next.is_whitespace());
        if !boundary {
            continue;
        }

        push_unit(&mut units, &text[start..i + c.len_utf8()]);
        start = text.len();
        while let Some(&(j, w)) = chars.peek() {
            if w.is_whitespace() {
                chars.next();
            } else {
                start = j;
                break;
            }
        }
    }
    push_unit(&mut units, &text[start..]);
    units
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                push_unit(&mut paragraphs, &current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        push_unit(&mut paragraphs, &current.join("\n"));
    }
    paragraphs
}

fn push_unit(units: &mut Vec<String>, raw: &str) {
    let unit = raw.trim();
    if !unit.is_empty() {
        units.push(unit.to_string());
    }
}

/// Longest run of whole trailing words of `text` totalling at most
/// `budget` characters (single spaces between words). The whole text is
/// returned when it already fits.
fn overlap_suffix(text: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    let text = text.trim();
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut total = 0usize;
    let mut take = 0usize;
    for word in words.iter().rev() {
        let add = word.chars().count() + usize::from(take > 0);
        if total + add > budget {
            break;
        }
        total += add;
        take += 1;
    }
    words[words.len() - take..].join(" ")
}
