// Licensed under the Apache License, Version 2.0.

//! Startup configuration, matching `spec.md` §6's table field-for-field.
//! Plain data (`serde`-serialisable, so an embedding application can load it
//! from its own config file) plus a `clap`-derived [`Cli`] for a standalone
//! session runner that just wants `Config::parse()` semantics.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default scrollback depth, per `spec.md` §3 ("Scrollback").
pub const DEFAULT_SCROLLBACK_LINES: usize = 1000;

/// Renderer hint: which glyph the UI adapter should draw for the cursor.
/// The core never draws anything itself (§1, out of scope: pixel
/// rendering) — this is carried through `render_snapshot()` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CursorShape {
    Underline,
    Bar,
    Hollow,
    Block,
    Image,
}

impl Default for CursorShape {
    fn default() -> Self { Self::Block }
}

/// Renderer hints for default/selection/cursor colours. Values are left as
/// opaque strings (e.g. `"#1d1f21"` or a named colour) — colour-name parsing
/// is explicitly out of scope (`spec.md` §1) and belongs to the UI adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultColors {
    pub fg: String,
    pub bg: String,
    pub cursor: String,
    pub sel_fg: String,
    pub sel_bg: String,
    pub underline: String,
}

impl Default for DefaultColors {
    fn default() -> Self {
        Self {
            fg: "#c5c8c6".to_string(),
            bg: "#1d1f21".to_string(),
            cursor: "#c5c8c6".to_string(),
            sel_fg: "#1d1f21".to_string(),
            sel_bg: "#373b41".to_string(),
            underline: "#c5c8c6".to_string(),
        }
    }
}

/// Startup configuration for a [`crate::terminal::Terminal`], matching
/// `spec.md` §6's configuration table and "environment variables set for the
/// child" section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub initial_size: (u16, u16),
    #[serde(default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
    #[serde(default)]
    pub default_colors: DefaultColors,
    #[serde(default)]
    pub cursor_shape: CursorShape,
    pub truecolor: bool,
    pub shell_override: Option<PathBuf>,
}

const fn default_scrollback_lines() -> usize { DEFAULT_SCROLLBACK_LINES }

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_size: (24, 80),
            scrollback_lines: DEFAULT_SCROLLBACK_LINES,
            default_colors: DefaultColors::default(),
            cursor_shape: CursorShape::default(),
            truecolor: false,
            shell_override: None,
        }
    }
}

impl Config {
    /// `TERM`/`COLORTERM` to set for the child, per `spec.md` §6.
    #[must_use]
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![("TERM", "xterm-256color".to_string())];
        if self.truecolor {
            env.push(("COLORTERM", "truecolor".to_string()));
        }
        env
    }

    /// The shell to exec: the configured override, else `$SHELL`, else
    /// `/bin/bash`, per `spec.md` §4.5 step 2.
    #[must_use]
    pub fn resolve_shell(&self) -> PathBuf {
        self.shell_override
            .clone()
            .or_else(|| std::env::var_os("SHELL").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("/bin/bash"))
    }
}

/// Command-line surface for a standalone session runner embedding this
/// crate. Not exercised by the core itself — an embedding binary parses this
/// and converts it with [`Cli::into_config`].
#[derive(Debug, Parser)]
#[command(name = "vt-core-session", about = "Run a shell session under a VT100/ANSI terminal core")]
pub struct Cli {
    /// Initial rows x cols, e.g. "24x80".
    #[arg(long, default_value = "24x80")]
    pub size: String,

    /// Scrollback depth in lines.
    #[arg(long, default_value_t = DEFAULT_SCROLLBACK_LINES)]
    pub scrollback_lines: usize,

    /// Enable truecolor (`COLORTERM=truecolor`) for the child.
    #[arg(long)]
    pub truecolor: bool,

    /// Shell to run instead of `$SHELL`/`/bin/bash`.
    #[arg(long)]
    pub shell: Option<PathBuf>,

    /// Cursor shape hint for the renderer.
    #[arg(long, value_enum, default_value_t = CursorShape::Block)]
    pub cursor_shape: CursorShape,
}

impl Cli {
    /// Parses `--size WxH` into `(rows, cols)`, defaulting to 24x80 on a
    /// malformed value rather than failing startup over a renderer hint.
    #[must_use]
    pub fn into_config(self) -> Config {
        let initial_size = self
            .size
            .split_once('x')
            .and_then(|(rows, cols)| Some((rows.parse().ok()?, cols.parse().ok()?)))
            .unwrap_or((24, 80));
        Config {
            initial_size,
            scrollback_lines: self.scrollback_lines,
            default_colors: DefaultColors::default(),
            cursor_shape: self.cursor_shape,
            truecolor: self.truecolor,
            shell_override: self.shell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.initial_size, (24, 80));
        assert_eq!(cfg.scrollback_lines, 1000);
        assert!(!cfg.truecolor);
    }

    #[test]
    fn child_env_sets_term_always_and_colorterm_when_truecolor() {
        let mut cfg = Config::default();
        assert_eq!(cfg.child_env(), vec![("TERM", "xterm-256color".to_string())]);
        cfg.truecolor = true;
        assert_eq!(
            cfg.child_env(),
            vec![("TERM", "xterm-256color".to_string()), ("COLORTERM", "truecolor".to_string())]
        );
    }

    #[test]
    fn resolve_shell_prefers_explicit_override() {
        let cfg = Config { shell_override: Some(PathBuf::from("/bin/zsh")), ..Config::default() };
        assert_eq!(cfg.resolve_shell(), PathBuf::from("/bin/zsh"));
    }

    #[test]
    fn cli_parses_size_into_rows_cols() {
        let cli = Cli { size: "30x120".to_string(), ..Cli::parse_from(["vt-core-session"]) };
        let cfg = cli.into_config();
        assert_eq!(cfg.initial_size, (30, 120));
    }

    #[test]
    fn cli_malformed_size_falls_back_to_default() {
        let cli = Cli { size: "bogus".to_string(), ..Cli::parse_from(["vt-core-session"]) };
        let cfg = cli.into_config();
        assert_eq!(cfg.initial_size, (24, 80));
    }
}
