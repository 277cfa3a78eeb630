//! Hex formatting for record dumps.

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Format a file offset as "decimal (0xhex)".
pub fn format_offset(offset: u64) -> String {
    format!("{} (0x{:x})", offset, offset)
}

/// Render `data` as a hex dump whose offset column starts at `base_offset`.
///
/// ```text
/// 00000040  42 45 47 49 4e 3a 56 43  41 52 44 0d 0a 56 45 52  |BEGIN:VCARD..VER|
/// ```
///
/// Lines are joined with `\n`; there is no trailing newline.
pub fn hex_dump(data: &[u8], base_offset: u64) -> String {
    let mut out = String::new();

    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let offset = base_offset.saturating_add((i * BYTES_PER_LINE) as u64);
        let _ = write!(out, "{:08x}  ", offset);

        for col in 0..BYTES_PER_LINE {
            if col == BYTES_PER_LINE / 2 {
                out.push(' ');
            }
            match chunk.get(col) {
                Some(b) => {
                    let _ = write!(out, "{:02x} ", b);
                }
                None => out.push_str("   "),
            }
        }

        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| printable(b)));
        out.extend(std::iter::repeat(' ').take(BYTES_PER_LINE - chunk.len()));
        out.push('|');
    }

    out
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() || b == b' ' {
        b as char
    } else {
        '.'
    }
}
