//! Greedy packing of atomic segments into token-bounded chunks.
//!
//! Single pass, order preserving, no look-ahead. Each segment is classified
//! against the current candidate as one of three [`Placement`]s and handled
//! accordingly. A sealed chunk is never revisited.

use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};

/// Marker folded into a candidate in place of a segment that cannot fit anywhere.
pub const ELLIPSIS: &str = "...";

/// A sealed, token-bounded group of consecutive segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Segments (header first, if any) joined by the delimiter
    pub text: String,

    /// Original segment indices covered, contiguous except for dropped segments
    pub indices: Vec<usize>,

    /// Token count of `text`
    pub token_count: usize,
}

/// Packing parameters.
#[derive(Debug, Clone, Copy)]
pub struct PackOptions<'a> {
    /// Upper bound on a sealed chunk's token count
    pub max_tokens: usize,

    /// String placed between joined segments
    pub delimiter: &'a str,

    /// Constant segment prefixed to every chunk
    pub header: Option<&'a str>,

    /// Fold an ellipsis marker into the candidate for each oversized segment
    pub allow_ellipsis: bool,
}

impl<'a> PackOptions<'a> {
    /// Options with no header and no ellipsis substitution.
    pub fn new(max_tokens: usize, delimiter: &'a str) -> Self {
        Self {
            max_tokens,
            delimiter,
            header: None,
            allow_ellipsis: false,
        }
    }

    pub fn with_header(mut self, header: &'a str) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_ellipsis(mut self) -> Self {
        self.allow_ellipsis = true;
        self
    }
}

/// Output of one packing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackResult {
    /// Sealed chunks, in order
    pub chunks: Vec<Chunk>,

    /// Oversized segments replaced by an ellipsis marker
    pub dropped_count: usize,

    /// All oversized segments, with or without a marker
    pub overflow_count: usize,
}

impl PackResult {
    /// Index group of each chunk, in order.
    pub fn index_groups(&self) -> Vec<&[usize]> {
        self.chunks.iter().map(|c| c.indices.as_slice()).collect()
    }

    /// Chunk texts, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Where a segment goes relative to the current candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Appending keeps the candidate within budget
    Fits { tokens: usize },
    /// Over budget even alone (with header); never placed
    DoesNotFitAlone { tokens: usize },
    /// Over budget with the candidate; seal and restart from this segment
    DoesNotFitWithCandidate { restart_tokens: usize },
}

/// The chunk under construction.
struct Candidate {
    text: String,
    parts: usize,
    indices: Vec<usize>,
    tokens: usize,
}

impl Candidate {
    fn start(header: Option<&str>, tokenizer: &dyn Tokenizer) -> Self {
        match header {
            Some(h) => Self {
                text: h.to_string(),
                parts: 1,
                indices: Vec::new(),
                tokens: tokenizer.count_tokens(h),
            },
            None => Self {
                text: String::new(),
                parts: 0,
                indices: Vec::new(),
                tokens: 0,
            },
        }
    }

    /// Text of the candidate with `part` joined on.
    fn joined_with(&self, part: &str, delimiter: &str) -> String {
        if self.parts == 0 {
            part.to_string()
        } else {
            let mut joined = String::with_capacity(self.text.len() + delimiter.len() + part.len());
            joined.push_str(&self.text);
            joined.push_str(delimiter);
            joined.push_str(part);
            joined
        }
    }

    fn push(&mut self, part: &str, delimiter: &str, tokens: usize) {
        if self.parts > 0 {
            self.text.push_str(delimiter);
        }
        self.text.push_str(part);
        self.parts += 1;
        self.tokens = tokens;
    }

    fn has_content(&self, header: Option<&str>) -> bool {
        match header {
            Some(_) => self.parts > 1,
            None => self.parts > 0,
        }
    }

    fn seal(self) -> Chunk {
        Chunk {
            text: self.text,
            indices: self.indices,
            token_count: self.tokens,
        }
    }
}

/// Text of `[header?, segment]` joined by the delimiter.
fn with_header(segment: &str, options: &PackOptions<'_>) -> String {
    match options.header {
        Some(h) => format!("{}{}{}", h, options.delimiter, segment),
        None => segment.to_string(),
    }
}

fn classify(
    candidate: &Candidate,
    segment: &str,
    options: &PackOptions<'_>,
    tokenizer: &dyn Tokenizer,
) -> Placement {
    let alone = tokenizer.count_tokens(&with_header(segment, options));
    if alone > options.max_tokens {
        return Placement::DoesNotFitAlone { tokens: alone };
    }

    let extended = tokenizer.count_tokens(&candidate.joined_with(segment, options.delimiter));
    if extended > options.max_tokens {
        Placement::DoesNotFitWithCandidate {
            restart_tokens: alone,
        }
    } else {
        Placement::Fits { tokens: extended }
    }
}

/// Greedily pack `segments` into chunks of at most `options.max_tokens`.
///
/// A segment that exactly reaches the budget stays in the current candidate.
/// Segments too large to fit even alone are skipped with a warning; with
/// `allow_ellipsis`, an `"..."` marker replaces each one when the marker itself
/// fits in the candidate.
pub fn pack(segments: &[&str], options: &PackOptions<'_>, tokenizer: &dyn Tokenizer) -> PackResult {
    let mut result = PackResult::default();
    let mut candidate = Candidate::start(options.header, tokenizer);

    for (index, segment) in segments.iter().enumerate() {
        match classify(&candidate, segment, options, tokenizer) {
            Placement::Fits { tokens } => {
                candidate.push(segment, options.delimiter, tokens);
                candidate.indices.push(index);
            }
            Placement::DoesNotFitAlone { tokens } => {
                tracing::warn!(
                    segment = index,
                    tokens,
                    max_tokens = options.max_tokens,
                    "Segment exceeds the token budget on its own; dropping it"
                );
                result.overflow_count += 1;

                if options.allow_ellipsis {
                    let with_marker = tokenizer
                        .count_tokens(&candidate.joined_with(ELLIPSIS, options.delimiter));
                    if with_marker <= options.max_tokens {
                        candidate.push(ELLIPSIS, options.delimiter, with_marker);
                        result.dropped_count += 1;
                    }
                }
            }
            Placement::DoesNotFitWithCandidate { restart_tokens } => {
                let next = Candidate {
                    text: with_header(segment, options),
                    parts: if options.header.is_some() { 2 } else { 1 },
                    indices: vec![index],
                    tokens: restart_tokens,
                };
                let sealed = std::mem::replace(&mut candidate, next);
                result.chunks.push(sealed.seal());
            }
        }
    }

    if candidate.has_content(options.header) {
        result.chunks.push(candidate.seal());
    }

    tracing::debug!(
        segments = segments.len(),
        chunks = result.chunks.len(),
        dropped = result.dropped_count,
        overflowed = result.overflow_count,
        max_tokens = options.max_tokens,
        "Packed segments"
    );

    result
}
