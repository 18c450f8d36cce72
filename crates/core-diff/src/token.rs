/// Split `text` into maximal runs of whitespace or non-whitespace.
/// Concatenating the tokens yields `text` again.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let ws = ch.is_whitespace();
        match current {
            Some(prev) if prev != ws => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        current = Some(ws);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_edges() {
        assert_eq!(tokenize("I  seen\tit."), vec!["I", "  ", "seen", "\t", "it."]);
        assert_eq!(tokenize(" a"), vec![" ", "a"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn multibyte_runs_stay_whole() {
        assert_eq!(tokenize("héllo wörld"), vec!["héllo", " ", "wörld"]);
    }
}
