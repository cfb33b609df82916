use unicode_segmentation::UnicodeSegmentation;

/// Longest text the speech endpoint accepts in a single request.
pub const MAX_CHUNK_CHARS: usize = 100;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_speakable(s: &str) -> bool {
    s.chars().any(char::is_alphanumeric)
}

/// Splits text into pieces of at most [`MAX_CHUNK_CHARS`] characters.
///
/// Breaks prefer sentence boundaries, then word boundaries; a single word longer
/// than the limit is cut. Pieces with nothing speakable (punctuation, whitespace)
/// are dropped, so the result is empty when the text has nothing to say.
pub fn split_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if !is_speakable(trimmed) {
        return Vec::new();
    }
    if char_len(trimmed) <= MAX_CHUNK_CHARS {
        return vec![trimmed.to_string()];
    }

    let mut pieces = Vec::new();
    for sentence in trimmed.split_sentence_bounds() {
        let sentence = sentence.trim();
        if !is_speakable(sentence) {
            continue;
        }
        if char_len(sentence) <= MAX_CHUNK_CHARS {
            pieces.push(sentence.to_string());
        } else {
            pack_words(sentence, &mut pieces);
        }
    }

    merge_pieces(pieces)
}

fn pack_words(sentence: &str, out: &mut Vec<String>) {
    let mut current = String::new();

    for word in sentence.split_word_bounds() {
        if char_len(&current) + char_len(word) <= MAX_CHUNK_CHARS {
            current.push_str(word);
            continue;
        }

        flush(&mut current, out);

        if char_len(word) <= MAX_CHUNK_CHARS {
            current.push_str(word);
            continue;
        }

        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(MAX_CHUNK_CHARS) {
            current.extend(piece);
            if piece.len() == MAX_CHUNK_CHARS {
                flush(&mut current, out);
            }
        }
    }

    flush(&mut current, out);
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    let piece = current.trim();
    if is_speakable(piece) {
        out.push(piece.to_string());
    }
    current.clear();
}

/// Joins neighbouring short pieces so fewer requests are made.
fn merge_pieces(pieces: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(pieces.len());

    for piece in pieces {
        match merged.last_mut() {
            Some(last) if char_len(last) + 1 + char_len(&piece) <= MAX_CHUNK_CHARS => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => merged.push(piece),
        }
    }

    merged
}
