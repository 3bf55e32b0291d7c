//! Command sequence serialization

use crate::command::Command;

/// Render a command sequence back to G-code text
///
/// Deterministic and passthrough-lossless: every command owns its raw line
/// text (parsed lines keep it verbatim, synthesized lines render it at
/// construction), so serialization is a plain join. Re-parsing the output
/// and serializing again reproduces the same bytes.
pub fn serialize(commands: &[Command]) -> String {
    let mut out = String::with_capacity(commands.iter().map(|c| c.raw.len() + 1).sum());
    for cmd in commands {
        out.push_str(&cmd.raw);
        out.push('\n');
    }
    out
}
