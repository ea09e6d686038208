//! Minimal RTF to plain-text conversion.

use super::{BackendError, BackendResult};

/// Destination groups whose contents are never rendered text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "footer",
    "headerl",
    "headerr",
    "footerl",
    "footerr",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "mmathPr",
];

pub fn is_rtf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"{\\rtf")
}

pub fn rtf_to_text(bytes: &[u8]) -> BackendResult<String> {
    if !is_rtf(bytes) {
        return Err(BackendError::parse("rtf", "missing {\\rtf header"));
    }

    let mut out = String::new();
    // One entry per open group: its skip state and `\uc` value.
    let mut groups: Vec<(bool, usize)> = Vec::new();
    let mut skipping = false;
    // Fallback characters that follow each `\uN`.
    let mut fallback_len = 1usize;
    let mut pending_fallback = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        match byte {
            b'{' => {
                groups.push((skipping, fallback_len));
                i += 1;
            }
            b'}' => {
                (skipping, fallback_len) = groups.pop().unwrap_or((false, 1));
                pending_fallback = 0;
                i += 1;
            }
            b'\\' => {
                i += 1;
                let Some(&next) = bytes.get(i) else { break };

                if next.is_ascii_alphabetic() {
                    let start = i;
                    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                        i += 1;
                    }
                    let word = std::str::from_utf8(&bytes[start..i]).unwrap_or_default();

                    let param_start = i;
                    if i < bytes.len() && bytes[i] == b'-' {
                        i += 1;
                    }
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                    let param = std::str::from_utf8(&bytes[param_start..i])
                        .ok()
                        .and_then(|p| p.parse::<i32>().ok());

                    if i < bytes.len() && bytes[i] == b' ' {
                        i += 1;
                    }

                    // Fallback text ends at the next control word.
                    pending_fallback = 0;

                    if SKIPPED_DESTINATIONS.contains(&word) {
                        skipping = true;
                        continue;
                    }
                    if skipping {
                        continue;
                    }

                    match word {
                        "par" | "line" | "sect" | "page" => out.push('\n'),
                        "tab" | "cell" => out.push('\t'),
                        "row" => out.push('\n'),
                        "emdash" => out.push('\u{2014}'),
                        "endash" => out.push('\u{2013}'),
                        "bullet" => out.push('\u{2022}'),
                        "lquote" => out.push('\u{2018}'),
                        "rquote" => out.push('\u{2019}'),
                        "ldblquote" => out.push('\u{201C}'),
                        "rdblquote" => out.push('\u{201D}'),
                        "uc" => fallback_len = param.map_or(1, |n| n.max(0) as usize),
                        "u" => {
                            if let Some(code) = param {
                                let code = if code < 0 { code + 65536 } else { code };
                                if let Some(ch) = char::from_u32(code as u32) {
                                    out.push(ch);
                                }
                                pending_fallback = fallback_len;
                            }
                        }
                        _ => {}
                    }
                } else {
                    i += 1;
                    match next {
                        b'*' => skipping = true,
                        b'\'' => {
                            let hex = bytes.get(i..i + 2).and_then(|h| std::str::from_utf8(h).ok());
                            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                                i += 2;
                                if pending_fallback > 0 {
                                    pending_fallback -= 1;
                                } else if !skipping {
                                    let (decoded, _, _) = encoding_rs::WINDOWS_1252
                                        .decode(std::slice::from_ref(&value));
                                    out.push_str(&decoded);
                                }
                            }
                        }
                        b'~' if !skipping => out.push('\u{00A0}'),
                        b'_' if !skipping => out.push('-'),
                        b'\n' | b'\r' if !skipping => out.push('\n'),
                        b'\\' | b'{' | b'}' if !skipping => out.push(next as char),
                        _ => {}
                    }
                }
            }
            b'\r' | b'\n' => i += 1,
            _ => {
                // Copy a run of plain bytes at once so multi-byte UTF-8 stays intact.
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b'{' | b'}' | b'\\' | b'\r' | b'\n') {
                    i += 1;
                }
                if skipping {
                    continue;
                }
                let skip = pending_fallback.min(i - start);
                pending_fallback -= skip;
                let run = &bytes[start + skip..i];
                out.push_str(&String::from_utf8_lossy(run));
            }
        }
    }

    Ok(out)
}
