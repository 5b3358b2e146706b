//! Build mode and watch scope, derived once from CLI flags.

/// Optimization level of a run.
///
/// Gates compression, source-map emission and error tracebacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Expanded output, companion source maps, full tracebacks.
    #[default]
    Development,
    /// Compressed/minified output, no source maps.
    Production,
}

impl BuildMode {
    pub const fn from_flag(production: bool) -> Self {
        if production {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Source maps are only written in development.
    #[inline]
    pub const fn source_maps(self) -> bool {
        !self.is_production()
    }

    /// Compiler errors carry their full trace in development.
    #[inline]
    pub const fn traces(self) -> bool {
        !self.is_production()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Which mapping kinds watch mode covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchScope {
    Styles,
    Scripts,
    #[default]
    All,
}

impl WatchScope {
    /// `--css` alone restricts to styles, `--js` alone to scripts;
    /// both or neither cover everything.
    pub const fn from_flags(css: bool, js: bool) -> Self {
        match (css, js) {
            (true, false) => Self::Styles,
            (false, true) => Self::Scripts,
            _ => Self::All,
        }
    }

    pub const fn styles(self) -> bool {
        matches!(self, Self::Styles | Self::All)
    }

    pub const fn scripts(self) -> bool {
        matches!(self, Self::Scripts | Self::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_scope_flags() {
        assert_eq!(WatchScope::from_flags(false, false), WatchScope::All);
        assert_eq!(WatchScope::from_flags(true, true), WatchScope::All);
        assert_eq!(WatchScope::from_flags(true, false), WatchScope::Styles);
        assert_eq!(WatchScope::from_flags(false, true), WatchScope::Scripts);
        assert!(WatchScope::Styles.styles() && !WatchScope::Styles.scripts());
    }

    #[test]
    fn test_mode_gates() {
        assert!(BuildMode::Development.source_maps());
        assert!(!BuildMode::Production.source_maps());
        assert!(!BuildMode::Production.traces());
        assert_eq!(BuildMode::from_flag(true), BuildMode::Production);
    }
}
