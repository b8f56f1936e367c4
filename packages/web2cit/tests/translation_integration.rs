//! Integration tests for end-to-end translation.
//!
//! These tests verify the full workflow:
//! 1. Load a domain's stored configuration
//! 2. Dispatch a webpage to candidate templates
//! 3. Evaluate templates against shared response caches
//! 4. Assemble citations

use std::sync::Arc;
use std::time::Duration;

use web2cit::{
    testing::{MockCitoid, MockFetcher, MockRevisionStore},
    DomainConfigLoader, FallbackTemplate, FieldName, Services, SimpleCitation,
    TranslateOptions, TranslatorConfig, Webpage,
};

const ARTICLE_URL: &str = "https://news.example.com/2022/01/sample-article";

const ARTICLE_HTML: &str = r#"<html>
<head>
  <title>Sample article | Example News</title>
  <meta property="og:title" content="Sample article">
  <meta name="author" content="Smith, John">
</head>
<body>
  <article>
    <h1>Sample article</h1>
    <span class="byline"><span class="first">John</span> <span class="last">Smith</span></span>
    <span class="byline"><span class="first">Jane</span> <span class="last">Doe</span></span>
    <time>January 27, 2022</time>
  </article>
</body>
</html>"#;

const PATTERNS: &str = r#"[
  {"pattern": "/*/*/*", "label": "Articles"},
  {"pattern": "/tag/**", "label": "Tags"}
]"#;

const TEMPLATES: &str = r#"<syntaxhighlight lang="json">[
  {
    "path": "/2021/12/other-article",
    "label": "Legacy layout",
    "fields": [
      {"fieldname": "title", "required": true, "procedures": [
        {"selections": [{"type": "xpath", "config": "//h2[@class='headline']"}], "transformations": []}
      ]}
    ]
  },
  {
    "path": "/2022/01/sample-article",
    "label": "Current layout",
    "fields": [
      {"fieldname": "itemType", "required": true, "procedures": [
        {"selections": [{"type": "citoid", "config": "itemType"}], "transformations": []}
      ]},
      {"fieldname": "title", "required": true, "procedures": [
        {"selections": [{"type": "xpath", "config": "//meta[@property='og:title']/@content"}], "transformations": []}
      ]},
      {"fieldname": "authorFirst", "required": false, "procedures": [
        {"selections": [{"type": "xpath", "config": "//span[@class='first']"}], "transformations": []}
      ]},
      {"fieldname": "authorLast", "required": false, "procedures": [
        {"selections": [{"type": "xpath", "config": "//span[@class='last']"}], "transformations": []}
      ]},
      {"fieldname": "date", "required": false, "procedures": [
        {"selections": [{"type": "xpath", "config": "//time"}], "transformations": [{"type": "date", "config": "en"}]}
      ]},
      {"fieldname": "publishedIn", "required": false, "procedures": [
        {"selections": [{"type": "xpath", "config": "//title"}], "transformations": [
          {"type": "split", "config": " | "},
          {"type": "range", "config": "1"}
        ]}
      ]}
    ]
  },
  {"path": "no-leading-slash", "fields": []}
]</syntaxhighlight>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("web2cit=debug")
        .with_test_writer()
        .try_init();
}

struct Fixture {
    services: Services,
    fetcher: Arc<MockFetcher>,
    citoid: Arc<MockCitoid>,
    loader: DomainConfigLoader,
}

fn fixture() -> Fixture {
    init_tracing();

    let fetcher = Arc::new(
        MockFetcher::new()
            .with_page(ARTICLE_URL, ARTICLE_HTML)
            .with_delay(Duration::from_millis(20)),
    );
    let citoid = Arc::new(
        MockCitoid::new().with_citation(
            ARTICLE_URL,
            SimpleCitation::new()
                .with_value("itemType", "newspaperArticle")
                .with_value("title", "Sample article (Citoid)")
                .with_value("date", "2022-01-27"),
        ),
    );

    let store = MockRevisionStore::new()
        .with_revision("Web2Cit/data/com/example/news/patterns.json", PATTERNS)
        .with_revision("Web2Cit/data/com/example/news/templates.json", TEMPLATES)
        .with_revision(
            "Web2Cit/data/com/example/news/tests.json",
            r#"[{"path": "/2022/01/sample-article", "fields": [{"fieldname": "title", "goal": ["Sample article"]}]}]"#,
        );

    Fixture {
        services: Services::new(fetcher.clone(), citoid.clone()),
        fetcher,
        citoid,
        loader: DomainConfigLoader::new(Arc::new(store), &TranslatorConfig::default()),
    }
}

#[tokio::test]
async fn test_translate_with_stored_templates() {
    let fx = fixture();
    let target = Webpage::new(ARTICLE_URL, &fx.services).unwrap();
    let domain = fx
        .loader
        .load(target.domain(), Some(FallbackTemplate::citoid_default(target.domain())))
        .await
        .unwrap();

    assert_eq!(domain.templates().count(), 2);
    assert_eq!(domain.tests().count(), 1);

    let outputs = domain
        .translate(&target, &TranslateOptions::default())
        .await
        .unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].label.as_deref(), Some("Current layout"));

    let citation = outputs[0].citation.as_ref().unwrap();
    assert_eq!(citation.item_type.as_deref(), Some("newspaperArticle"));
    assert_eq!(citation.title.as_deref(), Some("Sample article"));
    assert_eq!(citation.date.as_deref(), Some("2022-01-27"));
    assert_eq!(citation.published_in.as_deref(), Some("Example News"));
    assert_eq!(citation.authors.len(), 2);
    assert_eq!(citation.authors[1].first, "Jane");
    assert_eq!(citation.authors[1].last, "Doe");

    // Both templates read the page; it was fetched once.
    assert_eq!(fx.fetcher.call_count(ARTICLE_URL), 1);
    assert_eq!(fx.citoid.call_count(ARTICLE_URL), 1);
}

#[tokio::test]
async fn test_try_all_shares_one_fetch() {
    let fx = fixture();
    let target = Webpage::new(ARTICLE_URL, &fx.services).unwrap();
    let domain = fx
        .loader
        .load(target.domain(), Some(FallbackTemplate::citoid_default(target.domain())))
        .await
        .unwrap();

    let outputs = domain
        .translate(
            &target,
            &TranslateOptions::new()
                .with_try_all(true)
                .with_only_applicable(false),
        )
        .await
        .unwrap();

    let applicability: Vec<_> = outputs.iter().map(|o| o.applicable).collect();
    assert_eq!(applicability, vec![false, true, true]);
    assert_eq!(outputs[2].path, None);
    assert_eq!(
        outputs[2].citation.as_ref().unwrap().title.as_deref(),
        Some("Sample article (Citoid)")
    );

    assert_eq!(fx.fetcher.call_count(ARTICLE_URL), 1);
    assert_eq!(fx.citoid.call_count(ARTICLE_URL), 1);
}

#[tokio::test]
async fn test_field_outputs_are_introspectable() {
    let fx = fixture();
    let target = Webpage::new(ARTICLE_URL, &fx.services).unwrap();
    let domain = fx.loader.load(target.domain(), None).await.unwrap();

    let outputs = domain
        .translate(
            &target,
            &TranslateOptions::new().with_templates(["/2022/01/sample-article"]),
        )
        .await
        .unwrap();

    let published_in = outputs[0].field(FieldName::PublishedIn).unwrap();
    let procedure = &published_in.procedures[0];
    assert_eq!(procedure.selection_output, vec!["Sample article | Example News"]);
    assert_eq!(
        procedure.transformations,
        vec![
            vec!["Sample article".to_string(), "Example News".to_string()],
            vec!["Example News".to_string()],
        ]
    );
}

#[tokio::test]
async fn test_unknown_domain_uses_fallback_only() {
    let fx = fixture();
    let url = "https://other.example.org/page";
    fx.fetcher.add_page(url, "<html><body></body></html>");
    fx.citoid.add_citation(
        url,
        SimpleCitation::new()
            .with_value("itemType", "webpage")
            .with_value("title", "Other page"),
    );

    let target = Webpage::new(url, &fx.services).unwrap();
    let domain = fx
        .loader
        .load(target.domain(), Some(FallbackTemplate::citoid_default(target.domain())))
        .await
        .unwrap();
    assert_eq!(domain.templates().count(), 0);

    let outputs = domain
        .translate(&target, &TranslateOptions::default())
        .await
        .unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(
        outputs[0].citation.as_ref().unwrap().title.as_deref(),
        Some("Other page")
    );
    assert_eq!(fx.fetcher.call_count(url), 0);
}

#[tokio::test]
async fn test_fetch_failure_propagates() {
    let fx = fixture();
    let target = Webpage::new("https://news.example.com/2022/01/missing", &fx.services).unwrap();
    let domain = fx.loader.load(target.domain(), None).await.unwrap();

    let result = domain.translate(&target, &TranslateOptions::default()).await;
    assert!(matches!(result, Err(web2cit::TranslationError::Fetch(_))));
}
