// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// Re-export all common types from stratloop-core
pub use stratloop_core::common::*;

// Macros for error creation - these need to stay in stratloop-engine
// as they use crate-local paths

#[macro_export]
macro_rules! doc_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Document,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Document, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! import_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Import,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! analysis_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Analysis,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[test]
fn test_error_macros() {
    let err: Result<()> = doc_err!(SelfLink, "l1".to_owned());
    let err = err.unwrap_err();
    assert_eq!(ErrorKind::Document, err.kind);
    assert_eq!(ErrorCode::SelfLink, err.code);
    assert_eq!(Some("l1".to_owned()), err.details);

    let err: Result<()> = doc_err!(UnknownLink);
    assert_eq!(None, err.unwrap_err().details);

    let err: Result<()> = analysis_err!(BadConfig, "max_nodes must be positive".to_owned());
    assert_eq!(ErrorKind::Analysis, err.unwrap_err().kind);
}
