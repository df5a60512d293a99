/// Split response text into playback-sized chunks.
///
/// Chunks break only at sentence-ending punctuation (`.`, `!`, `?`) followed
/// by whitespace and never exceed `max_chars`, except that a single sentence
/// longer than the limit is emitted whole as its own oversized chunk rather
/// than being cut mid-word.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();
        if current.is_empty() {
            current = sentence;
            current_len = sentence_len;
        } else if current_len + 1 + sentence_len <= max_chars {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + sentence_len;
        } else {
            chunks.push(current);
            current = sentence;
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split text into sentences at `.`/`!`/`?` runs followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut iter = trimmed.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        match iter.peek() {
            Some(&(_, next)) if next.is_whitespace() => {
                let sentence = trimmed[start..i + c.len_utf8()].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = trimmed.len();
                while let Some(&(j, w)) = iter.peek() {
                    if w.is_whitespace() {
                        iter.next();
                    } else {
                        start = j;
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    if start < trimmed.len() {
        let tail = trimmed[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
    }
    sentences
}
