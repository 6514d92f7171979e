//! Export identifier sanitizing.

/// Convert a raw file or directory name into an export identifier.
///
/// Leading characters that cannot start an identifier (anything but an ASCII
/// letter) and trailing non-alphanumerics are dropped. Every remaining run of
/// non-alphanumerics is collapsed into an upper-case version of the
/// character that follows it.
///
/// Leading digits are dropped too, so `2-up` becomes `up`.
///
/// Reserved words are returned unchanged.
///
/// # Example
///
/// ```
/// use barrel::name::sanitize;
///
/// assert_eq!(sanitize("my-module"), "myModule");
/// assert_eq!(sanitize("1-my module!!"), "myModule");
/// assert_eq!(sanitize("2-up"), "up");
/// assert_eq!(sanitize("Button"), "Button");
/// ```
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw
        .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric());

    let mut out = String::with_capacity(trimmed.len());
    let mut pending_upper = false;
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_upper {
                out.push(c.to_ascii_uppercase());
                pending_upper = false;
            } else {
                out.push(c);
            }
        } else {
            pending_upper = true;
        }
    }
    out
}
