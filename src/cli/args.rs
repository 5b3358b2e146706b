//! Command-line interface definitions.

use clap::{ColorChoice, Parser, ValueEnum};
use std::path::PathBuf;

/// Declarative asset pipeline: SCSS, script bundles and minification
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Task to run
    #[arg(value_enum, default_value_t = Task::All)]
    pub task: Task,

    /// Production build: compressed output, minification, no source maps
    #[arg(short = 'p', long = "prod", visible_alias = "production")]
    pub production: bool,

    /// Watch stylesheets (alone: styles only)
    #[arg(long)]
    pub css: bool,

    /// Watch scripts (alone: scripts only)
    #[arg(long)]
    pub js: bool,

    /// Manifest path (default: kiln.toml, searched upward)
    #[arg(short = 'C', long, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// What one invocation does.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    /// Styles and scripts, then the minify-only pass in production
    #[default]
    All,
    /// Styles only
    Css,
    /// Scripts only
    Js,
    /// Minify-only pass (production)
    Minify,
    /// Rebuild on change until Ctrl+C
    Watch,
}

impl Task {
    pub const fn builds_styles(self) -> bool {
        matches!(self, Self::All | Self::Css)
    }

    pub const fn builds_scripts(self) -> bool {
        matches!(self, Self::All | Self::Js)
    }

    pub const fn runs_minify(self) -> bool {
        matches!(self, Self::All | Self::Minify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kiln"]).unwrap();
        assert_eq!(cli.task, Task::All);
        assert!(!cli.production);
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
    }

    #[test]
    fn test_production_spellings() {
        for flag in ["-p", "--prod", "--production"] {
            let cli = Cli::try_parse_from(["kiln", "css", flag]).unwrap();
            assert!(cli.production, "{flag}");
            assert_eq!(cli.task, Task::Css);
        }
    }

    #[test]
    fn test_watch_flags() {
        let cli = Cli::try_parse_from(["kiln", "watch", "--js", "-C", "site/kiln.toml"]).unwrap();
        assert_eq!(cli.task, Task::Watch);
        assert!(cli.js && !cli.css);
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
    }

    #[test]
    fn test_task_selection() {
        assert!(Task::All.builds_styles() && Task::All.builds_scripts() && Task::All.runs_minify());
        assert!(Task::Css.builds_styles() && !Task::Css.builds_scripts());
        assert!(!Task::Js.runs_minify());
        assert!(Task::Minify.runs_minify() && !Task::Minify.builds_styles());
        assert!(Cli::try_parse_from(["kiln", "serve"]).is_err());
    }
}
