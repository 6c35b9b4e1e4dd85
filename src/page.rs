//! Article page references and the path conventions around them.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::fmt;
use url::Url;

/// Site-relative prefix shared by every in-wiki article path.
pub const ARTICLE_PREFIX: &str = "/wiki/";
/// Reference of the site's landing page, which is never a useful hop.
pub const MAIN_PAGE: &str = "/wiki/Main_Page";

/// Bytes escaped in article titles. MediaWiki leaves `-_.~;:@$!*(),/` as is.
const TITLE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'$')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'/');

/// Site-relative path identifying one article, e.g. `/wiki/Barack_Obama`.
///
/// Titles under the article prefix are kept in the percent-encoded form the
/// wiki itself links with (`/wiki/S%C3%A3o_Paulo`), so references built from
/// user input compare equal to references taken from hrefs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageRef(String);

impl PageRef {
    /// Wraps an href taken from a page.
    ///
    /// Article paths get their title re-encoded canonically; anything else is
    /// kept verbatim. No validation is applied.
    pub fn from_href(href: &str) -> Self {
        match href.strip_prefix(ARTICLE_PREFIX) {
            Some(title) => Self(format!("{ARTICLE_PREFIX}{}", canonical_title(title))),
            None => Self(href.to_string()),
        }
    }

    /// Builds a reference from user input.
    ///
    /// Accepts a site-relative path (`/wiki/Barack_Obama`), an underscore title
    /// (`Barack_Obama`) or a plain title (`Barack Obama`).
    pub fn parse(input: &str) -> Result<Self, PageRefError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PageRefError::Empty);
        }
        let title = match trimmed.strip_prefix(ARTICLE_PREFIX) {
            Some(title) => title,
            None if trimmed.starts_with('/') => {
                return Err(PageRefError::NotAnArticle(trimmed.to_string()))
            }
            None => trimmed,
        };
        let title = canonical_title(title);
        if title.is_empty() {
            return Err(PageRefError::MissingTitle(trimmed.to_string()));
        }
        Ok(Self(format!("{ARTICLE_PREFIX}{title}")))
    }

    /// Raw path form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable title: prefix stripped, percent-decoded, underscores
    /// turned into spaces.
    pub fn display_title(&self) -> String {
        let title = self.0.strip_prefix(ARTICLE_PREFIX).unwrap_or(&self.0);
        percent_decode_str(title)
            .decode_utf8_lossy()
            .replace('_', " ")
    }

    /// True when the reference lives under the article path prefix.
    pub fn is_article_path(&self) -> bool {
        self.0.starts_with(ARTICLE_PREFIX)
    }

    /// True for the landing page.
    pub fn is_main_page(&self) -> bool {
        self.0.contains("Main_Page")
    }

    /// Absolute URL of this page on `base`.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.0)
    }
}

/// Decodes any existing escapes, joins words with underscores and re-encodes.
fn canonical_title(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let title = decoded.trim().replace(' ', "_");
    utf8_percent_encode(&title, TITLE_ENCODE_SET).to_string()
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reasons user input cannot become a [`PageRef`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRefError {
    /// Nothing but whitespace was supplied.
    #[error("page reference is empty")]
    Empty,
    /// The article prefix was given without a title.
    #[error("page reference {0:?} has no title after the article prefix")]
    MissingTitle(String),
    /// A site path outside the article namespace.
    #[error("page reference {0:?} is not an article path")]
    NotAnArticle(String),
}
