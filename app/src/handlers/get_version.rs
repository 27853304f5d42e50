use core::str::FromStr;

use crate::io::WriteView;
use common::AppError;

pub fn handler_get_version(out: &mut WriteView<'_>) -> Result<(), AppError> {
    let (major, minor, patch) =
        parse_version_string(env!("CARGO_PKG_VERSION")).ok_or(AppError::VersionParsingFail)?;
    out.append(&[major, minor, patch])
}

fn parse_version_string(input: &str) -> Option<(u8, u8, u8)> {
    // Input should be of the form "major.minor.patch"
    let mut parts = input.split('.');
    let major = u8::from_str(parts.next()?).ok()?;
    let minor = u8::from_str(parts.next()?).ok()?;
    let patch = u8::from_str(parts.next()?).ok()?;
    Some((major, minor, patch))
}
