#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn from_critical_requires_flag() {
    assert!(Fatal::from_critical(true).is_some());
    assert!(Fatal::from_critical(false).is_none());
}

#[test]
fn display_shows_message() {
    let fatal = Fatal::from_critical(true).unwrap();
    assert_eq!(fatal.to_string(), "fatal error emitted");
}
