//! Key Template Module
//!
//! Positional format strings (`"{0}/{1}::wordcount"`) rendered against call
//! arguments to produce cache keys.

use std::fmt::{self, Display, Write};

use crate::error::CacheError;

/// One positional argument for [`KeyTemplate::render`].
///
/// `Sync` so argument slices can be held across an await.
pub type KeyArg<'a> = &'a (dyn Display + Sync);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arg(usize),
}

// == Key Template ==
/// A parsed cache key template.
///
/// `{N}` is replaced by the N-th argument; `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl KeyTemplate {
    // == Parse ==
    /// Parses a template, rejecting unbalanced braces and non-numeric
    /// placeholders.
    pub fn parse(template: &str) -> Result<Self, CacheError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut index = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) => index.push(d),
                            None => {
                                return Err(CacheError::Template(format!(
                                    "unclosed placeholder in {template:?}"
                                )))
                            }
                        }
                    }
                    // Digits only: `{ 0 }` and `{+0}` are named fields, not indices
                    let index = Some(&index)
                        .filter(|i| i.bytes().all(|b| b.is_ascii_digit()))
                        .and_then(|i| i.parse::<usize>().ok())
                        .ok_or_else(|| {
                            CacheError::Template(format!(
                                "placeholder {{{index}}} in {template:?} is not a positional index"
                            ))
                        })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Arg(index));
                }
                '}' => {
                    return Err(CacheError::Template(format!(
                        "unmatched '}}' in {template:?}"
                    )))
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    // == Render ==
    /// Substitutes `args` positionally. Extra arguments are ignored.
    pub fn render(&self, args: &[KeyArg<'_>]) -> Result<String, CacheError> {
        let mut key = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => key.push_str(text),
                Segment::Arg(i) => {
                    let arg = args.get(*i).ok_or_else(|| {
                        CacheError::Template(format!(
                            "{:?} needs argument {} but only {} given",
                            self.source,
                            i,
                            args.len()
                        ))
                    })?;
                    write!(key, "{arg}").map_err(|e| CacheError::Template(e.to_string()))?;
                }
            }
        }
        Ok(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
