// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

/// Identifier of a node in a causal loop diagram.
pub type NodeId = String;
/// Identifier of a causal link.
pub type LinkId = String;
/// Identifier of a SWOT entry.
pub type SwotId = String;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DoesNotExist, // the named entity doesn't exist
    DuplicateNode,
    DuplicateLink,
    DuplicateSwotEntry,
    UnknownNode,
    UnknownLink,
    UnknownSwotEntry,
    UnknownEndpoint,
    SelfLink,
    EmptyIdentifier,
    BadDocument,
    BadConfig,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            DoesNotExist => "does_not_exist",
            DuplicateNode => "duplicate_node",
            DuplicateLink => "duplicate_link",
            DuplicateSwotEntry => "duplicate_swot_entry",
            UnknownNode => "unknown_node",
            UnknownLink => "unknown_link",
            UnknownSwotEntry => "unknown_swot_entry",
            UnknownEndpoint => "unknown_endpoint",
            SelfLink => "self_link",
            EmptyIdentifier => "empty_identifier",
            BadDocument => "bad_document",
            BadConfig => "bad_config",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Import,
    Document,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Import => "ImportError",
            ErrorKind::Document => "DocumentError",
            ErrorKind::Analysis => "AnalysisError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Document,
        ErrorCode::UnknownEndpoint,
        Some("link l1 targets missing node 'x'".to_owned()),
    );
    assert_eq!(
        "DocumentError{unknown_endpoint: link l1 targets missing node 'x'}",
        format!("{err}")
    );

    let err = Error::new(ErrorKind::Analysis, ErrorCode::BadConfig, None);
    assert_eq!("AnalysisError{bad_config}", format!("{err}"));
    assert_eq!(None, err.get_details());
}
