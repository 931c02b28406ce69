pub fn format_bool(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

pub fn format_null() -> &'static str {
    "null"
}

fn push_hex4(out: &mut String, unit: u16) {
    for shift in [12u16, 8, 4, 0] {
        let n = ((unit >> shift) & 0x0F) as u8;
        out.push(if n > 9 { (b'A' + n - 10) as char } else { (b'0' + n) as char });
    }
}

/// Quote `s`, escaping only tab, CR, LF, quote and backslash.
/// Every other character is copied through unchanged.
pub fn escape_and_quote_into(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    let mut run_start = 0;
    for (index, c) in s.char_indices() {
        let escaped = match c {
            '\t' => "\\t",
            '\r' => "\\r",
            '\n' => "\\n",
            '"' => "\\\"",
            '\\' => "\\\\",
            _ => continue,
        };
        out.push_str(&s[run_start..index]);
        out.push_str(escaped);
        run_start = index + c.len_utf8();
    }
    out.push_str(&s[run_start..]);
    out.push('"');
}

/// Quote `s`, passing printable ASCII through and writing everything else
/// as `\uXXXX` (uppercase hex, one escape per UTF-16 unit).
pub fn escape_unicode_and_quote_into(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    let mut run_start = 0;
    for (index, c) in s.char_indices() {
        if (' '..'\u{80}').contains(&c) && c != '"' && c != '\\' {
            continue;
        }
        out.push_str(&s[run_start..index]);
        run_start = index + c.len_utf8();
        match c {
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str("\\u");
                    push_hex4(out, *unit);
                }
            }
        }
    }
    out.push_str(&s[run_start..]);
    out.push('"');
}

pub fn escape_and_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    escape_and_quote_into(&mut out, s);
    out
}

pub fn escape_unicode_and_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    escape_unicode_and_quote_into(&mut out, s);
    out
}
