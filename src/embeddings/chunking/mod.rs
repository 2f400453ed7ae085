
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Document;

/// A contiguous slice of a document, ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    /// The segment text
    pub text: String,
    /// Name of the document the segment was cut from
    pub source: String,
    /// Position of the segment within the document
    pub index: usize,
}

/// Configuration for segment splitting, measured in characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum segment length
    pub max_segment_chars: usize,
    /// Characters carried over from the end of the previous segment
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_segment_chars: 300,
            overlap_chars: 30,
        }
    }
}

/// Granularity of a split, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitLevel {
    Paragraph,
    Line,
    Sentence,
    Word,
    Character,
}

impl SplitLevel {
    fn finer(self) -> Self {
        match self {
            Self::Paragraph => Self::Line,
            Self::Line => Self::Sentence,
            Self::Sentence => Self::Word,
            Self::Word | Self::Character => Self::Character,
        }
    }

    fn joiner(self) -> &'static str {
        match self {
            Self::Paragraph => "\n\n",
            Self::Line => "\n",
            Self::Sentence | Self::Word => " ",
            Self::Character => "",
        }
    }
}

/// A piece of text that fits in a segment, with the separator that preceded it
#[derive(Debug)]
struct Unit {
    text: String,
    joiner: &'static str,
}

/// Split a document into overlapping segments
#[inline]
pub fn split_document(document: &Document, config: &ChunkingConfig) -> Vec<TextSegment> {
    split_text(&document.text, &document.name(), config)
}

/// Split text into segments of at most `max_segment_chars` characters
#[inline]
pub fn split_text(text: &str, source: &str, config: &ChunkingConfig) -> Vec<TextSegment> {
    let max = config.max_segment_chars.max(1);
    let mut units = Vec::new();
    split_recursive(text, max, SplitLevel::Paragraph, &mut units);

    let segments: Vec<TextSegment> = merge_units(units, max, config.overlap_chars)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextSegment {
            text,
            source: source.to_string(),
            index,
        })
        .collect();

    debug!(
        "Split '{}' into {} segments (max {} chars, overlap {})",
        source,
        segments.len(),
        max,
        config.overlap_chars
    );

    segments
}

/// Break text down level by level until every unit fits
fn split_recursive(text: &str, max: usize, level: SplitLevel, units: &mut Vec<Unit>) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    if char_count(text) <= max {
        units.push(Unit {
            text: text.to_string(),
            joiner: level.joiner(),
        });
        return;
    }

    let pieces = match level {
        SplitLevel::Paragraph => text.split("\n\n").map(str::to_string).collect(),
        SplitLevel::Line => text.lines().map(str::to_string).collect(),
        SplitLevel::Sentence => split_sentences(text),
        SplitLevel::Word => text.split_whitespace().map(str::to_string).collect(),
        SplitLevel::Character => {
            hard_split(text, max, units);
            return;
        }
    };

    let next = level.finer();
    for piece in pieces {
        let before = units.len();
        split_recursive(&piece, max, next, units);
        // The first unit of each piece is joined with this level's separator
        if let Some(unit) = units.get_mut(before) {
            unit.joiner = level.joiner();
        }
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }

    sentences
}

fn hard_split(text: &str, max: usize, units: &mut Vec<Unit>) {
    let chars: Vec<char> = text.chars().collect();
    for (i, window) in chars.chunks(max).enumerate() {
        units.push(Unit {
            text: window.iter().collect(),
            joiner: if i == 0 {
                SplitLevel::Word.joiner()
            } else {
                SplitLevel::Character.joiner()
            },
        });
    }
}

/// Greedily pack units into segments and seed each new segment with overlap
fn merge_units(units: Vec<Unit>, max: usize, overlap: usize) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = char_count(&unit.text);
        let joiner_len = char_count(unit.joiner);

        if current.is_empty() {
            current = unit.text;
            current_len = unit_len;
            continue;
        }

        if current_len + joiner_len + unit_len <= max {
            current.push_str(unit.joiner);
            current.push_str(&unit.text);
            current_len += joiner_len + unit_len;
            continue;
        }

        // Room left for overlap once the unit and a separator are placed
        let room = max.saturating_sub(unit_len + 1);
        let seed = overlap_tail(&current, overlap.min(room));
        segments.push(std::mem::take(&mut current));

        if seed.is_empty() {
            current = unit.text;
            current_len = unit_len;
        } else {
            current_len = char_count(&seed) + 1 + unit_len;
            current = format!("{} {}", seed, unit.text);
        }
    }

    if !current.trim().is_empty() {
        segments.push(current);
    }

    segments
}

/// Last `overlap` characters of `text`, starting on a word boundary
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= overlap {
        return String::new();
    }

    let start = chars.len() - overlap;
    let mut tail = &chars[start..];
    if !chars[start - 1].is_whitespace() {
        // Cut landed inside a word; skip to the next one
        match tail.iter().position(|c| c.is_whitespace()) {
            Some(space) => tail = &tail[space..],
            None => return String::new(),
        }
    }

    tail.iter().collect::<String>().trim().to_string()
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}
