use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Path rendered for an ffmpeg/ffprobe argument.
///
/// A relative path starting with `-` would be parsed as an option, so it gets a
/// `./` prefix. The bytes of the path are kept as they are, so names that are
/// not valid UTF-8 still reach the tool intact.
pub fn safe_path_arg(path: &Path) -> Cow<'_, OsStr> {
    let raw = path.as_os_str();
    if raw.as_encoded_bytes().starts_with(b"-") {
        let mut prefixed = OsString::from("./");
        prefixed.push(raw);
        Cow::Owned(prefixed)
    } else {
        Cow::Borrowed(raw)
    }
}
