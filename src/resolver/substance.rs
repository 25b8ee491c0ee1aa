//! Substance resolver - picks exactly one label record for a user-entered name.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::matching::{first_match, is_compound_match, is_single_substance_match};
use super::step::ResolveStep;
use super::{LabelMatch, ResolutionPath, ResolveError, ResolverSettings, SettingsError};
use crate::label::{LabelSearch, SearchField, SearchPage, SearchRequest};
use crate::parser::SubstanceQuery;

/// Resolves names to single label records through a [`LabelSearch`].
///
/// A plain name is searched by substance name; when the first window has no
/// single-substance record the resolver scans further windows up to the
/// reported total, then falls back to a brand-name search. A compound name is
/// searched with all of its segments AND-joined and scanned for a record with
/// exactly that substance set.
#[derive(Clone)]
pub struct SubstanceResolver {
    search: Arc<dyn LabelSearch>,
    settings: ResolverSettings,
}

impl SubstanceResolver {
    /// Creates a resolver with default page sizes.
    #[must_use]
    pub fn new(search: Arc<dyn LabelSearch>) -> Self {
        Self {
            search,
            settings: ResolverSettings::default(),
        }
    }

    /// Creates a resolver with custom page sizes.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroPageSize`] when any page size is zero,
    /// since such a scan would never reach a terminal outcome.
    pub fn with_settings(
        search: Arc<dyn LabelSearch>,
        settings: ResolverSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self { search, settings })
    }

    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves one name to a single label record.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the name is empty, a search fails in a
    /// way no fallback covers, or no path yields a record.
    pub async fn resolve(
        &self,
        name: &str,
        api_key: Option<&str>,
    ) -> Result<LabelMatch, ResolveError> {
        self.resolve_with_cancel(name, api_key, &CancellationToken::new())
            .await
    }

    /// Resolves one name, stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`resolve`](Self::resolve), plus [`ResolveError::Cancelled`] when
    /// the token is cancelled before a result is reached.
    #[tracing::instrument(skip(self, api_key, cancel), fields(name = %name))]
    pub async fn resolve_with_cancel(
        &self,
        name: &str,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<LabelMatch, ResolveError> {
        let query = SubstanceQuery::parse(name);
        let mut step = ResolveStep::start(&query);

        loop {
            match step {
                ResolveStep::Resolved(found) => {
                    debug!(path = %found.path, composite = found.composite, "Resolved name");
                    return Ok(found);
                }
                ResolveStep::Failed(error) => {
                    debug!(error = %error, "Resolution failed");
                    return Err(error);
                }
                pending => {
                    if cancel.is_cancelled() {
                        return Err(ResolveError::Cancelled);
                    }
                    debug!(step = pending.label(), "Advancing resolution");
                    step = self.advance(pending, api_key, cancel).await;
                }
            }
        }
    }

    pub(crate) async fn advance(
        &self,
        step: ResolveStep,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> ResolveStep {
        match step {
            ResolveStep::Direct { segment } => self.direct(segment, api_key, cancel).await,
            ResolveStep::Paginate {
                segment,
                skip,
                total,
            } => self.paginate(segment, skip, total, api_key, cancel).await,
            ResolveStep::BrandFallback { segment } => {
                self.brand_fallback(segment, api_key, cancel).await
            }
            ResolveStep::Compound { segments, skip } => {
                self.compound(segments, skip, api_key, cancel).await
            }
            terminal => terminal,
        }
    }

    async fn direct(
        &self,
        segment: String,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> ResolveStep {
        let page_size = self.settings.page_size;
        let request = SearchRequest::new(SearchField::SubstanceName, segment.as_str(), page_size);

        match self.run_search(&request, api_key, cancel).await {
            Ok(page) => {
                if let Some(record) = first_match(&page.records, |record| {
                    is_single_substance_match(record, &segment)
                }) {
                    return ResolveStep::Resolved(LabelMatch::picked(
                        record.clone(),
                        page.total,
                        ResolutionPath::Direct,
                    ));
                }
                if page.total > page_size {
                    ResolveStep::Paginate {
                        segment,
                        skip: 0,
                        total: page.total,
                    }
                } else {
                    ResolveStep::BrandFallback { segment }
                }
            }
            Err(error) if error.is_no_matches() => ResolveStep::BrandFallback { segment },
            Err(error) => ResolveStep::Failed(error),
        }
    }

    async fn paginate(
        &self,
        segment: String,
        skip: u64,
        total: u64,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> ResolveStep {
        if skip >= total {
            return ResolveStep::BrandFallback { segment };
        }

        let page_size = self.settings.scan_page_size;
        let request = SearchRequest::new(SearchField::SubstanceName, segment.as_str(), page_size)
            .with_skip(skip);

        match self.run_search(&request, api_key, cancel).await {
            Ok(page) if page.is_empty() => ResolveStep::BrandFallback { segment },
            Ok(page) => {
                match first_match(&page.records, |record| {
                    is_single_substance_match(record, &segment)
                }) {
                    Some(record) => ResolveStep::Resolved(LabelMatch::picked(
                        record.clone(),
                        total,
                        ResolutionPath::Paginated,
                    )),
                    None => ResolveStep::Paginate {
                        segment,
                        skip: skip + page_size,
                        total,
                    },
                }
            }
            Err(error) if error.is_no_matches() => ResolveStep::BrandFallback { segment },
            Err(error) => ResolveStep::Failed(error),
        }
    }

    async fn brand_fallback(
        &self,
        segment: String,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> ResolveStep {
        let request = SearchRequest::new(
            SearchField::BrandName,
            segment.as_str(),
            self.settings.page_size,
        );

        // The brand hit is taken as-is; its substance count is not re-checked.
        match self.run_search(&request, api_key, cancel).await {
            Ok(SearchPage { records, total }) => match records.into_iter().next() {
                Some(record) => ResolveStep::Resolved(LabelMatch::raw(
                    record,
                    total,
                    ResolutionPath::BrandFallback,
                )),
                None => ResolveStep::Failed(ResolveError::BrandNotFound { name: segment }),
            },
            Err(error) => ResolveStep::Failed(error),
        }
    }

    async fn compound(
        &self,
        segments: Vec<String>,
        skip: u64,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> ResolveStep {
        let no_match = ResolveError::NoMatchingLabel {
            substance_count: segments.len(),
        };
        if skip >= self.settings.compound_skip_cap {
            return ResolveStep::Failed(no_match);
        }

        let page_size = self.settings.compound_page_size;
        let request =
            SearchRequest::all_of(SearchField::SubstanceName, &segments, page_size).with_skip(skip);

        match self.run_search(&request, api_key, cancel).await {
            Ok(page) if page.is_empty() => ResolveStep::Failed(no_match),
            Ok(page) => {
                match first_match(&page.records, |record| is_compound_match(record, &segments)) {
                    Some(record) => ResolveStep::Resolved(LabelMatch::picked(
                        record.clone(),
                        page.total,
                        ResolutionPath::Compound,
                    )),
                    None => ResolveStep::Compound {
                        segments,
                        skip: skip + page_size,
                    },
                }
            }
            Err(error) if error.is_no_matches() => ResolveStep::Failed(no_match),
            Err(error) => ResolveStep::Failed(error),
        }
    }

    async fn run_search(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<SearchPage, ResolveError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ResolveError::Cancelled),
            result = self.search.search(request, api_key) => result.map_err(ResolveError::from),
        }
    }
}

impl std::fmt::Debug for SubstanceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstanceResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::label::MockLabelSearch;
    use crate::label::mock::{label_record, no_matches, page_of};
    use crate::label::SearchError;

    fn resolver_with(mock: &Arc<MockLabelSearch>) -> SubstanceResolver {
        SubstanceResolver::new(Arc::clone(mock) as Arc<dyn LabelSearch>)
    }

    #[tokio::test]
    async fn test_direct_step_picks_single_substance_record() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["aspirin"],
            Ok(page_of(vec![
                label_record("combo", &["ASPIRIN", "CAFFEINE"], &[]),
                label_record("plain", &["ASPIRIN"], &[]),
            ])),
        );
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::Direct {
                    segment: "aspirin".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        let ResolveStep::Resolved(found) = step else {
            panic!("expected resolved step, got {step:?}");
        };
        assert_eq!(found.record, label_record("plain", &["ASPIRIN"], &[]));
        assert!(found.composite);
        assert_eq!(found.path, ResolutionPath::Direct);
    }

    #[tokio::test]
    async fn test_direct_step_without_match_and_small_total_goes_to_brand() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["aspirin"],
            Ok(page_of(vec![label_record("combo", &["ASPIRIN", "CAFFEINE"], &[])])),
        );
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::Direct {
                    segment: "aspirin".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::BrandFallback {
                segment: "aspirin".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_direct_step_without_match_and_large_total_paginates() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["aspirin"],
            Ok(SearchPage::new(
                vec![label_record("combo", &["ASPIRIN", "CAFFEINE"], &[])],
                2500,
            )),
        );
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::Direct {
                    segment: "aspirin".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::Paginate {
                segment: "aspirin".to_string(),
                skip: 0,
                total: 2500
            }
        );
    }

    #[tokio::test]
    async fn test_direct_step_hard_error_fails() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["aspirin"],
            Err(SearchError::http_status(500, None)),
        );
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::Direct {
                    segment: "aspirin".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::Failed(ResolveError::Search(SearchError::http_status(500, None)))
        );
    }

    #[tokio::test]
    async fn test_paginate_step_past_total_goes_to_brand_without_fetching() {
        let mock = Arc::new(MockLabelSearch::new());
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::Paginate {
                    segment: "aspirin".to_string(),
                    skip: 3000,
                    total: 2500,
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::BrandFallback {
                segment: "aspirin".to_string()
            }
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_brand_step_takes_top_record_unfiltered() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::BrandName,
            &["Excedrin"],
            Ok(page_of(vec![
                label_record("top", &["ACETAMINOPHEN", "ASPIRIN", "CAFFEINE"], &["Excedrin"]),
                label_record("next", &["ASPIRIN"], &["Excedrin"]),
            ])),
        );
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::BrandFallback {
                    segment: "Excedrin".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        let ResolveStep::Resolved(found) = step else {
            panic!("expected resolved step, got {step:?}");
        };
        assert_eq!(found.record.as_value()["id"], "top");
        assert!(!found.composite);
        assert_eq!(found.path, ResolutionPath::BrandFallback);
    }

    #[tokio::test]
    async fn test_brand_step_no_matches_is_final() {
        let mock = Arc::new(MockLabelSearch::new());
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::BrandFallback {
                    segment: "zzz".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(step, ResolveStep::Failed(ResolveError::Search(no_matches())));
    }

    #[tokio::test]
    async fn test_brand_step_empty_page_fails() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(SearchField::BrandName, &["zzz"], Ok(page_of(Vec::new())));
        let resolver = resolver_with(&mock);

        let step = resolver
            .advance(
                ResolveStep::BrandFallback {
                    segment: "zzz".to_string(),
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::Failed(ResolveError::BrandNotFound {
                name: "zzz".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_compound_step_at_cap_fails_without_fetching() {
        let mock = Arc::new(MockLabelSearch::new());
        let resolver = resolver_with(&mock);
        let cap = resolver.settings().compound_skip_cap;

        let step = resolver
            .advance(
                ResolveStep::Compound {
                    segments: vec!["a".to_string(), "b".to_string()],
                    skip: cap,
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::Failed(ResolveError::NoMatchingLabel { substance_count: 2 })
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_compound_step_advances_skip_when_page_has_no_match() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["aspirin", "caffeine"],
            Ok(page_of(vec![label_record(
                "triple",
                &["ACETAMINOPHEN", "ASPIRIN", "CAFFEINE"],
                &[],
            )])),
        );
        let resolver = resolver_with(&mock);
        let page_size = resolver.settings().compound_page_size;

        let step = resolver
            .advance(
                ResolveStep::Compound {
                    segments: vec!["aspirin".to_string(), "caffeine".to_string()],
                    skip: 0,
                },
                None,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            step,
            ResolveStep::Compound {
                segments: vec!["aspirin".to_string(), "caffeine".to_string()],
                skip: page_size
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_empty_name_fails_without_search() {
        let mock = Arc::new(MockLabelSearch::new());
        let resolver = resolver_with(&mock);

        let err = resolver.resolve(" ; ", None).await.unwrap_err();
        assert_eq!(err, ResolveError::EmptyName);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_with_cancelled_token_stops_before_search() {
        let mock = Arc::new(MockLabelSearch::new());
        let resolver = resolver_with(&mock);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver
            .resolve_with_cancel("aspirin", None, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::Cancelled);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_with_settings_rejects_zero_scan_window() {
        let mock = Arc::new(MockLabelSearch::new());
        let settings = ResolverSettings {
            scan_page_size: 0,
            ..ResolverSettings::default()
        };

        let err =
            SubstanceResolver::with_settings(Arc::clone(&mock) as Arc<dyn LabelSearch>, settings)
                .unwrap_err();
        assert_eq!(
            err,
            SettingsError::ZeroPageSize {
                setting: "scan_page_size"
            }
        );
    }

    #[tokio::test]
    async fn test_single_record_scan_window_still_terminates() {
        let mock = Arc::new(MockLabelSearch::new());
        mock.respond(
            SearchField::SubstanceName,
            &["x"],
            Ok(SearchPage::new(
                vec![label_record("combo", &["X", "Y"], &[])],
                4,
            )),
        );
        let settings = ResolverSettings::new(1, 1, 1, 3).unwrap();
        let resolver =
            SubstanceResolver::with_settings(Arc::clone(&mock) as Arc<dyn LabelSearch>, settings)
                .unwrap();

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            resolver.resolve("x", None),
        )
        .await
            .unwrap()
            .unwrap_err();

        // Brand search has no rule, so the walk ends in the API's no-matches error.
        assert!(err.is_no_matches());
        let skips: Vec<u64> = mock
            .calls()
            .iter()
            .filter(|request| request.field == SearchField::SubstanceName)
            .map(|request| request.skip)
            .collect();
        assert_eq!(skips, vec![0, 0, 1, 2, 3]);
    }
}
