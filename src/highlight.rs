//! Styled-run reconstruction from token streams
//!
//! Consumers that style text (highlighting, previews) need contiguous
//! runs, not raw tokens. [`HighlightReconstructor`] drives a
//! [`TokenScanner`] over a region and maps every token to a style from a
//! token-id table; spans no rule claimed carry the style registered for
//! [`TokenId::NONE`], so the returned runs tile the region. What a
//! "style" is stays up to the host — any cloneable value works.

use crate::document::DocumentAccess;
use crate::error::{BadPosition, RuleError};
use crate::position::Region;
use crate::scanner::TokenScanner;
use crate::token::TokenId;
use ahash::RandomState;
use hashbrown::HashMap;

/// A contiguous span with one style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun<S> {
    /// The span the style covers
    pub region: Region,
    /// The style attached to the span
    pub style: S,
}

/// Maps token streams to styled runs
pub struct HighlightReconstructor<S> {
    scanner: TokenScanner,
    styles: HashMap<TokenId, S, RandomState>,
}

impl<S> core::fmt::Debug for HighlightReconstructor<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HighlightReconstructor").finish_non_exhaustive()
    }
}

impl<S: Clone> HighlightReconstructor<S> {
    /// Create a reconstructor around a configured scanner
    ///
    /// `styles` maps token identifiers to styles and must contain an
    /// entry for [`TokenId::NONE`], the style of unclaimed text; fails
    /// with [`RuleError::InvalidArgument`] otherwise.
    pub fn new<I>(scanner: TokenScanner, styles: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (TokenId, S)>,
    {
        let styles: HashMap<TokenId, S, RandomState> = styles.into_iter().collect();
        if !styles.contains_key(&TokenId::NONE) {
            return Err(RuleError::invalid_argument(
                "the style table lacks an entry for the filler token",
            ));
        }
        Ok(Self { scanner, styles })
    }

    /// Derive the styled runs covering `region`
    ///
    /// Tokens without a style entry fall back to the filler style.
    pub fn runs<D: DocumentAccess>(
        &mut self,
        document: &D,
        region: Region,
    ) -> Result<Vec<StyledRun<S>>, BadPosition> {
        self.scanner.parse(document, region)?;
        let mut runs = Vec::new();
        while let Some(token) = self.scanner.next_token(document) {
            let style = self
                .styles
                .get(&token.id)
                .unwrap_or_else(|| &self.styles[&TokenId::NONE]);
            runs.push(StyledRun {
                region: token.region,
                style: style.clone(),
            });
        }
        Ok(runs)
    }
}
