// src/tag.rs
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::TagError;

const OMITEMPTY: &str = "omitempty";

/// What a field annotation asks the engine to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Directive {
    /// Overwrite the destination field with the source value.
    pub eligible: bool,
    /// Leave the destination alone when the source value is empty.
    pub skip_if_empty: bool,
}

/// Parse an annotation of the form `<bool>[,omitempty]`.
///
/// The empty string means "not eligible". The boolean accepts the usual text
/// forms (`true`, `True`, `TRUE`, `t`, `T`, `1` and their false counterparts).
pub fn parse(input: &str) -> Result<Directive, TagError> {
    if input.is_empty() {
        return Ok(Directive::default());
    }

    let tokens: Vec<&str> = input.split(',').collect();
    match tokens.as_slice() {
        [flag] => Ok(Directive {
            eligible: parse_flag(input, flag)?,
            skip_if_empty: false,
        }),
        [flag, option] => {
            if *option != OMITEMPTY {
                return Err(TagError::InvalidOption {
                    input: input.to_string(),
                    token: option.to_string(),
                });
            }
            Ok(Directive {
                eligible: parse_flag(input, flag)?,
                skip_if_empty: true,
            })
        }
        _ => Err(TagError::TooManyTokens {
            input: input.to_string(),
        }),
    }
}

fn parse_flag(input: &str, token: &str) -> Result<bool, TagError> {
    match token {
        "" => Ok(false),
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Ok(false),
        _ => Err(TagError::InvalidFlag {
            input: input.to_string(),
            token: token.to_string(),
        }),
    }
}

impl FromStr for Directive {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Canonical annotation text; parses back to the same directive.
impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.eligible)?;
        if self.skip_if_empty {
            write!(f, ",{OMITEMPTY}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn directive(eligible: bool, skip_if_empty: bool) -> Directive {
        Directive {
            eligible,
            skip_if_empty,
        }
    }

    #[test]
    fn legal_forms() {
        assert_eq!(parse("").unwrap(), directive(false, false));
        assert_eq!(parse("true").unwrap(), directive(true, false));
        assert_eq!(parse("false").unwrap(), directive(false, false));
        assert_eq!(parse("true,omitempty").unwrap(), directive(true, true));
        assert_eq!(parse("false,omitempty").unwrap(), directive(false, true));
    }

    #[test]
    fn alternate_boolean_spellings() {
        for t in ["1", "t", "T", "True", "TRUE"] {
            assert_eq!(parse(t).unwrap(), directive(true, false), "{t}");
        }
        for f in ["0", "f", "F", "False", "FALSE"] {
            assert_eq!(parse(f).unwrap(), directive(false, false), "{f}");
        }
    }

    #[test]
    fn empty_flag_with_option() {
        assert_eq!(parse(",omitempty").unwrap(), directive(false, true));
    }

    #[test]
    fn non_boolean_flag() {
        let err = parse("gurka,omitempty").unwrap_err();
        assert_eq!(
            err,
            TagError::InvalidFlag {
                input: "gurka,omitempty".into(),
                token: "gurka".into(),
            }
        );
        assert!(parse("yes").is_err());
        assert!(parse(" true").is_err());
        assert!(parse("tRUE").is_err());
    }

    #[test]
    fn option_checked_before_flag() {
        let err = parse("gurka,omitemtpy").unwrap_err();
        assert!(matches!(err, TagError::InvalidOption { ref token, .. } if token == "omitemtpy"));
    }

    #[test]
    fn too_many_tokens() {
        let err = parse("true,false,omitempty").unwrap_err();
        assert_eq!(
            err,
            TagError::TooManyTokens {
                input: "true,false,omitempty".into()
            }
        );
        assert!(parse(",,").is_err());
    }

    #[test]
    fn display_round_trips() {
        for d in [directive(true, true), directive(true, false), directive(false, true)] {
            assert_eq!(d.to_string().parse::<Directive>().unwrap(), d);
        }
        assert_eq!(directive(true, true).to_string(), "true,omitempty");
    }
}
