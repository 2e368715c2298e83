//! The host's argument splitter.

/// Splits a command line into arguments using the host's quoting rules.
///
/// - Whitespace separates arguments outside of quotes.
/// - `"` opens and closes a quoted argument; the quotes are dropped. Text
///   directly before an opening quote becomes its own argument.
/// - `\` escapes `"`, a space, or another `\`. Before any other character the
///   backslash is kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => {
                    if !matches!(escaped, '"' | ' ' | '\\') {
                        current.push('\\');
                    }
                    current.push(escaped);
                }
                None => current.push('\\'),
            },
            '"' => {
                quoted = !quoted;
                if !quoted || !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("  give  steve\t10 "), vec!["give", "steve", "10"]);
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            tokenize(r#"bc "the boss has spawned" now"#),
            vec!["bc", "the boss has spawned", "now"]
        );
    }

    #[test]
    fn empty_quotes_yield_an_empty_argument() {
        assert_eq!(tokenize(r#"say """#), vec!["say", ""]);
    }

    #[test]
    fn backslash_escapes() {
        assert_eq!(tokenize(r#"say \"hi\""#), vec!["say", "\"hi\""]);
        assert_eq!(tokenize(r"say a\ b"), vec!["say", "a b"]);
        assert_eq!(tokenize(r"path c:\temp"), vec!["path", r"c:\temp"]);
    }

    #[test]
    fn blank_text_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}
