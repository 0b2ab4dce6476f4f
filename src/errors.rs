use serde::Serialize;
use thiserror::Error;

/// The kind of a failure, independent of the context it carries.
///
/// Lets callers ask "was this a type mismatch?" without destructuring the
/// error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    DstNil,
    SrcNil,
    DstNotPointer,
    SrcNotStruct,
    TypeMismatch,
    FieldNotSettable,
    TagValueWrong,
    DepthExceeded,
}

/// Annotation grammar violations. Every variant keeps the raw annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("{token:?} in tag {input:?} is not a valid boolean")]
    InvalidFlag { input: String, token: String },

    #[error("{token:?} in tag {input:?} is not a valid option, expected `omitempty`")]
    InvalidOption { input: String, token: String },

    #[error("wrong number of tags in {input:?}, only true/false,omitempty allowed")]
    TooManyTokens { input: String },
}

impl TagError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::TagValueWrong
    }

    /// The annotation that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            TagError::InvalidFlag { input, .. }
            | TagError::InvalidOption { input, .. }
            | TagError::TooManyTokens { input } => input,
        }
    }
}

/// Everything a copy can fail with. The first error encountered is returned;
/// the destination may already be partially overwritten at that point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyError {
    #[error("input dst is nil")]
    DstNil,

    #[error("input src is nil")]
    SrcNil,

    #[error("input dst must be a mutable reference")]
    DstNotPointer,

    #[error("input src must be a record value")]
    SrcNotStruct,

    #[error("dst ({dst}) and src ({src}) are not the same type")]
    TypeMismatch { dst: &'static str, src: &'static str },

    #[error("field `{field}` cannot be set")]
    FieldNotSettable { field: String },

    #[error("bad overwrite tag on field `{field}`: {source}")]
    Tag {
        field: String,
        #[source]
        source: TagError,
    },

    #[error("field `{field}` is nested deeper than the limit of {limit}")]
    DepthExceeded { field: String, limit: usize },
}

impl CopyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CopyError::DstNil => ErrorKind::DstNil,
            CopyError::SrcNil => ErrorKind::SrcNil,
            CopyError::DstNotPointer => ErrorKind::DstNotPointer,
            CopyError::SrcNotStruct => ErrorKind::SrcNotStruct,
            CopyError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CopyError::FieldNotSettable { .. } => ErrorKind::FieldNotSettable,
            CopyError::Tag { source, .. } => source.kind(),
            CopyError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
        }
    }
}

// Type alias for results that use `CopyError` as the error type
pub type Result<T> = std::result::Result<T, CopyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_errors_report_raw_input() {
        let err = TagError::TooManyTokens {
            input: "true,false,omitempty".into(),
        };
        assert_eq!(err.input(), "true,false,omitempty");
        assert!(err.to_string().contains("true,false,omitempty"));
        assert_eq!(err.kind(), ErrorKind::TagValueWrong);
    }

    #[test]
    fn wrapped_tag_error_keeps_its_kind() {
        let err = CopyError::Tag {
            field: "t.n".into(),
            source: TagError::InvalidFlag {
                input: "gurka".into(),
                token: "gurka".into(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::TagValueWrong);
        assert!(err.to_string().contains("`t.n`"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
