//! Server-side prefix invalidation script.
//!
//! The whole scan-and-delete loop runs as one Lua script so large
//! namespaces are not invalidated at one network round trip per batch,
//! and no key list is ever materialized in the client. Deletion is
//! atomic per iteration, not as a whole: keys written while the scan
//! runs may or may not be observed, matching `SCAN`'s own guarantees.

/// Keys examined per `SCAN` iteration.
pub const SCAN_BATCH: usize = 100;

/// Builds the flush script for an already-namespaced key prefix.
///
/// The script returns the number of deleted keys. The prefix is escaped
/// for both the glob pattern and the Lua string literal, so a literal
/// prefix can never widen or break the match.
pub(crate) fn flush_script(prefix: &str) -> String {
    let pattern = lua_escape(&glob_escape(prefix));
    format!(
        "local cursor = 0\n\
         local deleted = 0\n\
         repeat\n\
         \x20   local batch = redis.call('SCAN', cursor, 'MATCH', '{pattern}*', 'COUNT', {SCAN_BATCH})\n\
         \x20   cursor = tonumber(batch[1])\n\
         \x20   for _, name in ipairs(batch[2]) do\n\
         \x20       redis.call('DEL', name)\n\
         \x20       deleted = deleted + 1\n\
         \x20   end\n\
         until cursor == 0\n\
         return deleted"
    )
}

/// Escapes glob metacharacters so the prefix matches literally.
fn glob_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '^' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a string for embedding in a single-quoted Lua literal.
fn lua_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_embeds_prefix_pattern_and_batch_size() {
        let script = flush_script("wp_page:");
        assert!(script.contains("'MATCH', 'wp_page:*'"));
        assert!(script.contains("'COUNT', 100"));
        assert!(script.contains("return deleted"));
    }

    #[test]
    fn empty_prefix_scans_everything() {
        let script = flush_script("");
        assert!(script.contains("'MATCH', '*'"));
    }

    #[test]
    fn glob_metacharacters_match_literally() {
        let script = flush_script("wp_a*b?");
        assert!(script.contains(r"'MATCH', 'wp_a\\*b\\?*'"));
    }

    #[test]
    fn quotes_cannot_break_the_literal() {
        let script = flush_script("wp_o'brien");
        assert!(script.contains(r"'MATCH', 'wp_o\'brien*'"));
    }
}
