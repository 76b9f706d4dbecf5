pub const DEFAULT_CHUNK_SIZE: usize = 1_000;
pub const DEFAULT_OVERLAP: usize = 200;

/// Window sizes are counted in characters, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Split a document into overlapping windows of at most `chunk_size` chars.
///
/// Documents at or below `chunk_size` come back as a single chunk. Longer
/// documents are windowed; a window that does not reach the document end is
/// cut just after the last sentence terminator found in its final 30%, and
/// the next window starts `overlap` chars before the previous end.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= config.chunk_size {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let raw_end = (start + config.chunk_size).min(chars.len());
        let mut end = raw_end;
        if raw_end < chars.len() {
            if let Some(cut) = sentence_cut(&chars[start..raw_end], config.chunk_size) {
                end = start + cut;
            }
        }

        let piece = chars[start..end].iter().collect::<String>();
        let piece = piece.trim().to_string();
        if !piece.is_empty() {
            chunks.push(piece);
        }

        if end >= chars.len() {
            break;
        }
        // max(start + 1) keeps the window moving even for degenerate configs
        start = end.saturating_sub(config.overlap).max(start + 1);
    }

    chunks
}

/// Position just after the last sentence terminator in the window, provided
/// the terminator sits strictly past 70% of `chunk_size`.
fn sentence_cut(window: &[char], chunk_size: usize) -> Option<usize> {
    let threshold = chunk_size as f64 * 0.7;
    for index in (0..window.len().saturating_sub(1)).rev() {
        if index as f64 <= threshold {
            break;
        }
        let terminator = matches!(
            [window[index], window[index + 1]],
            ['.', ' '] | ['.', '\n'] | ['!', ' '] | ['?', ' '] | ['?', '\n']
        );
        if terminator {
            return Some(index + 1);
        }
    }
    None
}
