//! Page format registry.
//!
//! A page's format is the suffix of its stored file name. Known suffixes
//! map to a markup language with a display name and an editor mode;
//! anything else is shown as the bare suffix. Rendering to HTML is left to
//! the caller.

use std::fmt;

/// Suffix used for new pages when none is given.
pub const DEFAULT_FORMAT: &str = "mdown";

/// Markup languages with a known set of suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Markup {
    Markdown,
    ReStructuredText,
    Textile,
    Html,
}

impl Markup {
    pub const ALL: [Markup; 4] = [
        Markup::Markdown,
        Markup::ReStructuredText,
        Markup::Textile,
        Markup::Html,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::ReStructuredText => "reStructuredText",
            Self::Textile => "Textile",
            Self::Html => "HTML",
        }
    }

    /// Syntax mode name for a browser editor, where one exists.
    pub fn editor_mode(&self) -> Option<&'static str> {
        match self {
            Self::Markdown => Some("markdown"),
            Self::ReStructuredText => Some("rst"),
            Self::Textile | Self::Html => None,
        }
    }

    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            Self::Markdown => &["mdown", "markdown", "md", "mdn", "mkdn", "mkd"],
            Self::ReStructuredText => &["rst", "rest"],
            Self::Textile => &["textile"],
            Self::Html => &["html", "htm"],
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|markup| markup.suffixes().contains(&suffix))
    }
}

/// A page's format: its file suffix plus the markup it denotes, if known.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageFormat {
    suffix: String,
    markup: Option<Markup>,
}

impl PageFormat {
    pub fn from_suffix(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let markup = Markup::from_suffix(&suffix);
        Self { suffix, markup }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn markup(&self) -> Option<Markup> {
        self.markup
    }

    /// The markup's name, or the suffix itself for unknown formats.
    pub fn display_name(&self) -> &str {
        match self.markup {
            Some(markup) => markup.name(),
            None => &self.suffix,
        }
    }

    pub fn editor_mode(&self) -> Option<&'static str> {
        self.markup.and_then(|markup| markup.editor_mode())
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::from_suffix(DEFAULT_FORMAT)
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
