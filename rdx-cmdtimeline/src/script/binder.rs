//! Positional parameter substitution.
//!
//! Placeholders are `{0}`, `{1}`, … and refer to the arguments passed to
//! `start`. `{{` and `}}` produce literal braces. Anything else involving a
//! brace is malformed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A placeholder refers to an argument that was not passed.
    #[error("placeholder {{{index}}} is out of range ({available} parameter(s) given)")]
    IndexOutOfRange { index: usize, available: usize },

    /// A brace at the given 1-based column does not form a placeholder or an escape.
    #[error("malformed placeholder at column {column}")]
    Malformed { column: usize },
}

/// Replaces every placeholder in `line` with the matching entry of `params`.
pub fn bind(line: &str, params: &[String]) -> Result<String, BindError> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut digits = String::new();
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == '}' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                if !closed || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(BindError::Malformed { column: pos + 1 });
                }
                let index: usize = digits
                    .parse()
                    .map_err(|_| BindError::Malformed { column: pos + 1 })?;
                let value = params.get(index).ok_or(BindError::IndexOutOfRange {
                    index,
                    available: params.len(),
                })?;
                out.push_str(value);
            }
            '}' => {
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(BindError::Malformed { column: pos + 1 });
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn substitutes_positional_placeholders() {
        let bound = bind("give {0} {1} {0}", &params(&["steve", "10"])).unwrap();
        assert_eq!(bound, "give steve 10 steve");
    }

    #[test]
    fn unused_parameters_are_fine() {
        assert_eq!(bind("say hi", &params(&["x"])).unwrap(), "say hi");
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(
            bind("say {{{0}}}", &params(&["boss"])).unwrap(),
            "say {boss}"
        );
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let err = bind("say {2}", &params(&["a", "b"])).unwrap_err();
        assert_eq!(
            err,
            BindError::IndexOutOfRange {
                index: 2,
                available: 2
            }
        );
    }

    #[test]
    fn malformed_placeholders_are_errors() {
        let p = params(&["a"]);
        assert_eq!(bind("say {", &p), Err(BindError::Malformed { column: 5 }));
        assert_eq!(bind("say {x}", &p), Err(BindError::Malformed { column: 5 }));
        assert_eq!(bind("say }", &p), Err(BindError::Malformed { column: 5 }));
        assert_eq!(bind("say {}", &p), Err(BindError::Malformed { column: 5 }));
    }
}
