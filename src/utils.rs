use std::fmt::Write;

/// Appends a printable form of `ch` to `out`: line breaks, tabs and apostrophes
/// are escaped with a backslash, anything outside of printable ASCII becomes a
/// `\uXXXX` escape.
pub(crate) fn write_printable_char(out: &mut String, ch: char) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\'' => out.push_str("\\'"),
        c if (c as u32) > 127 || (c as u32) < 32 => {
            // writing into a `String` never fails
            let _ = write!(out, "\\u{:04x}", c as u32);
        }
        c => out.push(c),
    }
}

/// Makes a character safe to put in a diagnostic message.
pub fn printable_char(ch: char) -> String {
    let mut out = String::new();
    write_printable_char(&mut out, ch);
    out
}

/// Makes a string safe to put in a diagnostic message.
pub fn printable(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        write_printable_char(&mut out, ch);
    }
    out
}

/// Reserves room for one more entry in a bookkeeping table.
///
/// Tables grow to `max(8, 2 * capacity)` so that element, namespace, attribute
/// and entity tables all follow the same amortized growth.
pub(crate) fn ensure_room<T>(table: &mut Vec<T>, what: &str) {
    if table.len() < table.capacity() {
        return;
    }
    let new_size = std::cmp::max(8, 2 * table.capacity());
    log::trace!(
        target: "xml_pull::tables",
        "growing {} table from {} to {} entries",
        what,
        table.capacity(),
        new_size
    );
    table.reserve_exact(new_size - table.len());
}
