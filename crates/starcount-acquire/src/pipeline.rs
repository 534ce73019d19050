use crate::error::PipelineError;
use crate::fetch::{
    fetch_count, HttpSource, PageSource, StarCount, StarWidget, DEFAULT_STAR_SELECTOR,
};
use crate::output::{read_dataset, write_dataset};
use crate::resolve::UrlResolver;
use starcount_model::Dataset;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "search-4-telescope.json";
pub const DEFAULT_OUTPUT: &str = "search-4-telescope-updated.json";
pub const DEFAULT_ORIGIN: &str = "https://github.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything one enrichment run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dataset to read.
    pub input: PathBuf,
    /// Where the enriched dataset is written. Overwritten if it exists.
    pub output: PathBuf,
    /// Base URL project names are resolved against.
    pub origin: String,
    /// CSS selector of the star counter element.
    pub selector: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header sent with each request.
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            origin: DEFAULT_ORIGIN.to_string(),
            selector: DEFAULT_STAR_SELECTOR.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("starcount/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Per-run tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries processed.
    pub total: usize,
    /// Entries whose page yielded a count.
    pub updated: usize,
    /// Entries whose page had no star counter.
    pub missing: usize,
    /// Entries whose fetch or count parsing failed.
    pub failed: usize,
}

/// Enrich the configured input dataset over HTTP and write the result.
pub async fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let source = HttpSource::new(&config.user_agent, config.timeout)?;
    run_with(config, &source).await
}

/// Same as [`run`], with pages coming from `source`.
///
/// The output file is only written once every entry has been processed.
pub async fn run_with<S: PageSource>(
    config: &PipelineConfig,
    source: &S,
) -> Result<RunSummary, PipelineError> {
    let resolver = UrlResolver::new(&config.origin).map_err(PipelineError::Origin)?;
    let widget = StarWidget::new(&config.selector)?;

    let mut dataset = read_dataset(&config.input)?;
    let summary = enrich(&mut dataset, &resolver, &widget, source).await?;
    write_dataset(&dataset, &config.output)?;

    tracing::info!(
        total = summary.total,
        updated = summary.updated,
        missing = summary.missing,
        failed = summary.failed,
        "Enrichment complete"
    );
    Ok(summary)
}

/// Resolve each entry's URL and fill in its star count, strictly in order.
///
/// A resolution failure aborts; a fetch failure stores the sentinel and continues.
pub async fn enrich<S: PageSource>(
    dataset: &mut Dataset,
    resolver: &UrlResolver,
    widget: &StarWidget,
    source: &S,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary {
        total: dataset.len(),
        ..Default::default()
    };

    for (index, entry) in dataset.results.iter_mut().enumerate() {
        let url = resolver
            .resolve(&entry.name, &entry.url)
            .map_err(|err| PipelineError::Resolve {
                name: entry.name.clone(),
                source: err,
            })?;
        entry.url = url;

        tracing::info!(index, name = %entry.name, url = %entry.url, "Fetching star count");
        match fetch_count(source, widget, &entry.url).await {
            Ok(count) => {
                entry.stars = count.value();
                match count {
                    StarCount::Counted(_) => summary.updated += 1,
                    StarCount::WidgetMissing => summary.missing += 1,
                }
            }
            Err(e) => {
                tracing::warn!(url = %entry.url, error = %e, "Error fetching stars");
                entry.mark_unknown();
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{star_page, StaticPages};
    use starcount_model::{Entry, STARS_UNKNOWN};
    use std::fs;
    use std::path::Path;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("starcount-{tag}-{}.json", std::process::id()))
    }

    fn config(tag: &str) -> PipelineConfig {
        PipelineConfig {
            input: temp_path(&format!("{tag}-in")),
            output: temp_path(&format!("{tag}-out")),
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    fn write_input(path: &Path, json: &str) {
        fs::write(path, json).unwrap();
    }

    fn read_output(path: &Path) -> Dataset {
        let json = fs::read_to_string(path).unwrap();
        Dataset::from_json(&json).unwrap()
    }

    fn cleanup(config: &PipelineConfig) {
        let _ = fs::remove_file(&config.input);
        let _ = fs::remove_file(&config.output);
    }

    fn entry(name: &str, url: &str) -> Entry {
        Entry {
            name: name.into(),
            url: url.into(),
            description: format!("{name} description"),
            tags: vec!["neovim".into(), name.into()],
            score: 3.25,
            stars: 0,
        }
    }

    #[tokio::test]
    async fn test_single_entry_end_to_end() {
        let config = config("e2e");
        write_input(
            &config.input,
            r#"{"results":[{"name":"foo/bar","url":"","stars":0}],"total":1}"#,
        );
        let source = StaticPages::default().with_stars("https://github.com/foo/bar", "2.5k");

        let summary = run_with(&config, &source).await.unwrap();
        let output = read_output(&config.output);
        cleanup(&config);

        assert_eq!(summary, RunSummary { total: 1, updated: 1, missing: 0, failed: 0 });
        assert_eq!(output.total, 1);
        assert_eq!(output.results[0].name, "foo/bar");
        assert_eq!(output.results[0].url, "https://github.com/foo/bar");
        assert_eq!(output.results[0].stars, 2500);
    }

    #[tokio::test]
    async fn test_order_and_untouched_fields_preserved() {
        let mut dataset = Dataset {
            results: vec![
                entry("a/one", ""),
                entry("b/two", "https://github.com/b/two"),
                entry("c/three", "c/three"),
                entry("d/four", ""),
            ],
            total: 117,
        };
        let original = dataset.clone();
        let source = StaticPages::default()
            .with_stars("https://github.com/a/one", "532")
            .with_stars("https://github.com/b/two", "1.2k")
            .with_stars("https://github.com/c/three", "not a number");
        let resolver = UrlResolver::new(DEFAULT_ORIGIN).unwrap();
        let widget = StarWidget::new(DEFAULT_STAR_SELECTOR).unwrap();

        let summary = enrich(&mut dataset, &resolver, &widget, &source)
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { total: 4, updated: 2, missing: 1, failed: 1 });
        assert_eq!(dataset.total, original.total);
        assert_eq!(dataset.len(), original.len());
        for (after, before) in dataset.results.iter().zip(&original.results) {
            assert_eq!(after.name, before.name);
            assert_eq!(after.description, before.description);
            assert_eq!(after.tags, before.tags);
            assert_eq!(after.score, before.score);
            assert!(after.url.starts_with("https://github.com/"));
        }
        let stars: Vec<i64> = dataset.results.iter().map(|e| e.stars).collect();
        assert_eq!(stars, vec![532, 1200, STARS_UNKNOWN, STARS_UNKNOWN]);

        let requested = source.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                "https://github.com/a/one",
                "https://github.com/b/two",
                "https://github.com/c/three",
                "https://github.com/d/four",
            ]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_counts_stored_as_unknown() {
        let mut dataset = Dataset {
            results: vec![entry("a/minus", ""), entry("a/minus-k", ""), entry("a/inf", "")],
            total: 3,
        };
        let source = StaticPages::default()
            .with_stars("https://github.com/a/minus", "-5")
            .with_stars("https://github.com/a/minus-k", "-1.5k")
            .with_stars("https://github.com/a/inf", "infk");
        let resolver = UrlResolver::new(DEFAULT_ORIGIN).unwrap();
        let widget = StarWidget::new(DEFAULT_STAR_SELECTOR).unwrap();

        let summary = enrich(&mut dataset, &resolver, &widget, &source)
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { total: 3, updated: 0, missing: 0, failed: 3 });
        assert!(dataset.results.iter().all(|e| e.stars == STARS_UNKNOWN));
    }

    #[tokio::test]
    async fn test_unreachable_host_still_writes_output() {
        let config = PipelineConfig {
            origin: "http://127.0.0.1:1/".into(),
            ..config("unreachable")
        };
        write_input(
            &config.input,
            r#"{"results":[
                {"name":"foo/bar","url":"","description":"first","tags":["x"],"score":1.5,"stars":7},
                {"name":"baz/qux","url":"","description":"second","tags":[],"score":0.5,"stars":9}
            ],"total":2}"#,
        );

        let summary = run(&config).await.unwrap();
        let output = read_output(&config.output);
        cleanup(&config);

        assert_eq!(summary.failed, 2);
        assert_eq!(output.total, 2);
        assert_eq!(output.len(), 2);
        assert_eq!(output.results[0].url, "http://127.0.0.1:1/foo/bar");
        assert_eq!(output.results[1].description, "second");
        assert!(output.results.iter().all(|e| e.stars == STARS_UNKNOWN));
    }

    #[tokio::test]
    async fn test_run_against_http_server() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foo/bar"))
            .respond_with(ResponseTemplate::new(200).set_body_string(star_page("2.5k")))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/baz/qux"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let base = mock_server.uri();
        let config = PipelineConfig {
            origin: format!("{base}/"),
            ..config("http")
        };
        write_input(
            &config.input,
            r#"{"results":[
                {"name":"foo/bar","url":"","stars":0},
                {"name":"baz/qux","url":"https://github.com/baz/qux","stars":3}
            ],"total":9}"#,
        );

        let summary = run(&config).await.unwrap();
        let output = read_output(&config.output);
        cleanup(&config);

        assert_eq!(summary, RunSummary { total: 2, updated: 1, missing: 1, failed: 0 });
        assert_eq!(output.total, 9);
        assert_eq!(output.results[0].url, format!("{base}/foo/bar"));
        assert_eq!(output.results[0].stars, 2500);
        assert_eq!(output.results[1].url, format!("{base}/baz/qux"));
        assert_eq!(output.results[1].stars, STARS_UNKNOWN);
    }

    #[tokio::test]
    async fn test_resolve_failure_is_fatal() {
        let config = config("resolve");
        write_input(
            &config.input,
            r#"{"results":[{"name":"http://[::1","url":""}],"total":1}"#,
        );

        let result = run_with(&config, &StaticPages::default()).await;
        let output_exists = config.output.exists();
        cleanup(&config);

        assert!(matches!(result, Err(PipelineError::Resolve { .. })));
        assert!(!output_exists);
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let config = config("no-input");
        let result = run_with(&config, &StaticPages::default()).await;
        assert!(matches!(result, Err(PipelineError::ReadInput { .. })));
        assert!(!config.output.exists());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input, PathBuf::from("search-4-telescope.json"));
        assert_eq!(config.output, PathBuf::from("search-4-telescope-updated.json"));
        assert_eq!(config.origin, "https://github.com/");
        assert_eq!(config.selector, "#repo-stars-counter-star");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
