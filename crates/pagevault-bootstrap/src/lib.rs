//! # Pagevault Bootstrap
//!
//! Integration contract for the host cache engine's generated bootstrap
//! file.
//!
//! The host regenerates its early-loaded bootstrap source itself; this
//! crate pins down the *effect* the rewrite must have — which symbols the
//! patched file carries — plus a reliable, idempotent recognizer for
//! "already patched". The patched bootstrap must:
//!
//! 1. define a path symbol pointing at this module's install directory,
//! 2. define a path symbol pointing at the resolved configuration file,
//! 3. replace the host's default page-cache-read class with this
//!    module's class, passing it both symbols.

use std::path::PathBuf;

/// Marker symbol whose presence identifies an applied patch.
pub const PATH_SYMBOL: &str = "$pagevault_path";

/// Symbol carrying the resolved configuration file path.
pub const CONFIG_PATH_SYMBOL: &str = "$pagevault_config_path";

/// Class replacing the host's default page-cache-read implementation.
pub const CACHE_CLASS: &str = "Pagevault_Cache";

/// Error type for bootstrap verification.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("bootstrap is missing required symbols: {0:?}")]
    MissingSymbols(Vec<&'static str>),
}

/// The stanza a patched bootstrap must carry.
#[derive(Clone, Debug)]
pub struct BootstrapPatch {
    /// Install directory of this module.
    pub install_dir: PathBuf,
    /// Resolved configuration file path handed to the cache class.
    pub config_path: PathBuf,
}

impl BootstrapPatch {
    pub fn new(install_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            config_path: config_path.into(),
        }
    }

    /// Renders the stanza carrying the three required symbols.
    pub fn render(&self) -> String {
        format!(
            "// BEGIN pagevault integration\n\
             {PATH_SYMBOL} = '{install}';\n\
             {CONFIG_PATH_SYMBOL} = '{config}';\n\
             $page_cache_class = '{CACHE_CLASS}';\n\
             // END pagevault integration\n",
            install = quote_escape(&self.install_dir.display().to_string()),
            config = quote_escape(&self.config_path.display().to_string()),
        )
    }

    /// Applies the stanza to a bootstrap buffer. Idempotent: an already
    /// patched buffer is returned unchanged.
    pub fn apply(&self, contents: &str) -> String {
        if is_applied(contents) {
            return contents.to_string();
        }
        let mut out = String::with_capacity(contents.len() + 256);
        out.push_str(contents);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.render());
        out
    }
}

/// Whether the bootstrap buffer already carries the integration.
///
/// Marker-substring detection, same as the original integration check;
/// the marker appears in every rendered stanza and nowhere in a vanilla
/// bootstrap.
pub fn is_applied(contents: &str) -> bool {
    contents.contains(PATH_SYMBOL)
}

/// Verifies that a patched bootstrap carries all required symbols.
pub fn verify(contents: &str) -> Result<(), IntegrationError> {
    let missing: Vec<&'static str> = [PATH_SYMBOL, CONFIG_PATH_SYMBOL, CACHE_CLASS]
        .into_iter()
        .filter(|symbol| !contents.contains(*symbol))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IntegrationError::MissingSymbols(missing))
    }
}

fn quote_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VANILLA: &str = "<?php\n$rocket_path = '/var/www/cache';\n";

    fn patch() -> BootstrapPatch {
        BootstrapPatch::new(
            "/var/www/plugins/pagevault",
            "/var/www/content/pagevault-config/config.json",
        )
    }

    #[test]
    fn vanilla_bootstrap_is_not_integrated() {
        assert!(!is_applied(VANILLA));
        assert!(matches!(
            verify(VANILLA),
            Err(IntegrationError::MissingSymbols(missing)) if missing.len() == 3
        ));
    }

    #[test]
    fn applied_bootstrap_is_recognized_and_verifies() {
        let patched = patch().apply(VANILLA);
        assert!(is_applied(&patched));
        verify(&patched).unwrap();
        assert!(patched.contains("'/var/www/plugins/pagevault'"));
        assert!(patched.contains("'/var/www/content/pagevault-config/config.json'"));
    }

    #[test]
    fn apply_is_idempotent() {
        let once = patch().apply(VANILLA);
        let twice = patch().apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn paths_with_quotes_stay_inside_the_literal() {
        let patch = BootstrapPatch::new("/srv/o'brien/pagevault", "/srv/config.json");
        let rendered = patch.render();
        assert!(rendered.contains(r"'/srv/o\'brien/pagevault'"));
    }
}
