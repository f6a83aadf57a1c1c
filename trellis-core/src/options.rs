//! Engine behavior switches.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling how a run interprets its event stream.
    ///
    /// The default is lenient, namespace-unaware matching with trimmed body text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u8 {
        /// Match registrations against element namespace URIs.
        const NAMESPACE_AWARE = 1 << 0;
        /// Warn about unmatched elements and missing bind targets.
        const STRICT = 1 << 1;
        /// Pass body text to actions without trimming.
        const PRESERVE_WHITESPACE = 1 << 2;
    }
}

impl Options {
    /// Whether namespace-qualified matching is on.
    pub fn namespace_aware(self) -> bool {
        self.contains(Options::NAMESPACE_AWARE)
    }

    /// Whether strict-validation warnings are on.
    pub fn strict(self) -> bool {
        self.contains(Options::STRICT)
    }
}
