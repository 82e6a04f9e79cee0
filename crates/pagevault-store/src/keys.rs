//! Cache key namespacing.
//!
//! Every logical key is transformed before it reaches the store:
//! `effective_key = [salt] + tenant_prefix + logical_key`. The transform
//! is the sole tenancy-isolation mechanism and must be applied
//! byte-for-byte identically by every read, write, existence check and
//! prefix scan, or cross-tenant collisions occur.

/// Suffix of the sibling key holding a value's modification timestamp.
pub const MODIFIED_SUFFIX: &str = "-modified";

/// Builds the effective store key for a logical key.
pub fn namespaced(salt: Option<&str>, tenant_prefix: &str, key: &str) -> String {
    let salt = salt.unwrap_or("");
    let mut out = String::with_capacity(salt.len() + tenant_prefix.len() + key.len());
    out.push_str(salt);
    out.push_str(tenant_prefix);
    out.push_str(key);
    out
}

/// Logical key of the modification-timestamp sibling.
pub fn modified_key(key: &str) -> String {
    format!("{key}{MODIFIED_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_precedes_tenant_prefix() {
        assert_eq!(
            namespaced(Some("prod:"), "wp_", "page:/home"),
            "prod:wp_page:/home"
        );
    }

    #[test]
    fn missing_salt_is_empty() {
        assert_eq!(namespaced(None, "wp_", "page:/home"), "wp_page:/home");
    }

    #[test]
    fn transform_is_deterministic() {
        let a = namespaced(Some("s"), "wp1_", "k");
        let b = namespaced(Some("s"), "wp1_", "k");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_tenant_prefixes_never_collide() {
        // Non-overlapping prefixes keep key spaces disjoint for any key.
        let keys = ["page:/home", "wp2_page:/home", "", "-modified"];
        for key in keys {
            for other in keys {
                assert_ne!(
                    namespaced(None, "wp1_", key),
                    namespaced(None, "wp2_", other)
                );
            }
        }
    }

    #[test]
    fn modified_sibling_appends_suffix() {
        assert_eq!(modified_key("page:/home"), "page:/home-modified");
    }
}
