//! Intrinsic function names.
//!
//! YAML templates may write intrinsic functions as shorthand tags (`!Sub`,
//! `!Ref`); the long form is a key (`Fn::Sub`, `Ref`). Shorthand is mapped to
//! the canonical long form so both spellings produce the same property path.

/// Prefix that marks a shorthand tag.
pub const SHORTHAND_MARKER: char = '!';

/// Canonical names that are treated as structure inside property paths.
pub const INTRINSIC_FUNCTIONS: &[&str] = &[
    "Ref",
    "Condition",
    "Fn::And",
    "Fn::Base64",
    "Fn::Cidr",
    "Fn::Equals",
    "Fn::FindInMap",
    "Fn::ForEach",
    "Fn::GetAtt",
    "Fn::GetAZs",
    "Fn::If",
    "Fn::ImportValue",
    "Fn::Join",
    "Fn::Length",
    "Fn::Not",
    "Fn::Or",
    "Fn::Select",
    "Fn::Split",
    "Fn::Sub",
    "Fn::ToJsonString",
    "Fn::Transform",
];

/// Maps a tag to its canonical function name.
///
/// `!Ref` becomes `Ref`, any other `!X` becomes `Fn::X`; text without the
/// shorthand marker is returned unchanged.
///
/// # Example
///
/// ```
/// use cfnpath::resolve::intrinsics::normalize_intrinsic;
///
/// assert_eq!(normalize_intrinsic("!Ref"), "Ref");
/// assert_eq!(normalize_intrinsic("!GetAtt"), "Fn::GetAtt");
/// assert_eq!(normalize_intrinsic("Fn::GetAtt"), "Fn::GetAtt");
/// ```
pub fn normalize_intrinsic(tag: &str) -> String {
    match tag.strip_prefix(SHORTHAND_MARKER) {
        Some("Ref") => "Ref".to_string(),
        Some(name) => format!("Fn::{name}"),
        None => tag.to_string(),
    }
}

pub fn is_intrinsic_function(name: &str) -> bool {
    INTRINSIC_FUNCTIONS.contains(&name)
}

/// The canonical function name for a tag, if it names a known intrinsic.
pub fn intrinsic_for_tag(tag: &str) -> Option<String> {
    let name = normalize_intrinsic(tag);
    is_intrinsic_function(&name).then_some(name)
}
