//! Integration tests for the provider adapters using wiremock HTTP mocks.

use std::time::Duration;

use itinera_core::{PlaceQuery, ProviderTag, SearchTimeouts};
use itinera_images::{
    build_http_client, search_isolated, BingImageProvider, GoogleImageProvider, ImageError,
    ImageProvider, PexelsProvider, RelevanceEvaluator, UnsplashProvider, WikipediaProvider,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn client() -> reqwest::Client {
    build_http_client("itinera-test/0.1").expect("client construction should not fail")
}

fn eiffel() -> PlaceQuery {
    PlaceQuery::new("Eiffel Tower").with_locality("Paris")
}

// ---------------------------------------------------------------------------
// Unsplash
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsplash_maps_and_filters_results() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "total": 4,
        "results": [
            {
                "urls": {
                    "regular": "https://images.unsplash.com/eiffel-tower-night.jpg",
                    "small": "https://images.unsplash.com/eiffel-tower-night-small.jpg"
                },
                "description": null,
                "alt_description": "Eiffel Tower at night"
            },
            {
                "urls": { "small": "https://images.unsplash.com/photo-2.jpg" },
                "description": "Eiffel Tower from the Seine",
                "alt_description": null
            },
            {
                "urls": { "regular": "https://images.unsplash.com/photo-3.jpg" },
                "description": "a croissant",
                "alt_description": "breakfast"
            },
            {
                "urls": { "regular": "https://images.unsplash.com/eiffel-logo.png" },
                "description": "Eiffel Tower logo",
                "alt_description": null
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "Eiffel Tower"))
        .and(query_param("per_page", "10"))
        .and(query_param("orientation", "landscape"))
        .and(query_param("order_by", "relevance"))
        .and(header("authorization", "Client-ID unsplash-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let provider =
        UnsplashProvider::with_base_url(client(), "unsplash-key", TIMEOUT, &server.uri()).unwrap();
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .expect("search should succeed");

    let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://images.unsplash.com/eiffel-tower-night.jpg",
            "https://images.unsplash.com/photo-2.jpg",
        ]
    );
    assert_eq!(images[0].description, "Eiffel Tower at night");
    assert_eq!(images[1].description, "Eiffel Tower from the Seine");
    assert!(images.iter().all(|i| i.source == ProviderTag::Unsplash));
}

#[tokio::test]
async fn unsplash_auth_failure_is_an_error_and_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(401).set_body_string("OAuth error"))
        .mount(&server)
        .await;

    let provider =
        UnsplashProvider::with_base_url(client(), "bad-key", TIMEOUT, &server.uri()).unwrap();
    let evaluator = RelevanceEvaluator::default();

    let err = provider.search(&eiffel(), &evaluator).await.unwrap_err();
    assert!(matches!(err, ImageError::UnexpectedStatus { status: 401, .. }));

    assert!(search_isolated(&provider, &eiffel(), &evaluator)
        .await
        .is_empty());
}

// ---------------------------------------------------------------------------
// Pexels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pexels_uses_raw_key_and_caps_results() {
    let server = MockServer::start().await;

    let photos: Vec<serde_json::Value> = (1..=6)
        .map(|i| {
            serde_json::json!({
                "src": { "large": format!("https://images.pexels.com/photos/{i}/eiffel-tower.jpeg") },
                "alt": format!("Eiffel Tower view {i}")
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("query", "Eiffel Tower"))
        .and(header("authorization", "pexels-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "photos": photos })))
        .mount(&server)
        .await;

    let provider =
        PexelsProvider::with_base_url(client(), "pexels-key", TIMEOUT, &server.uri()).unwrap();
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), itinera_images::PER_PROVIDER_LIMIT);
    assert_eq!(
        images[0].url,
        "https://images.pexels.com/photos/1/eiffel-tower.jpeg"
    );
    assert_eq!(images[0].description, "Eiffel Tower view 1");
}

#[tokio::test]
async fn pexels_falls_back_to_medium_and_skips_missing_urls() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "photos": [
            { "src": { "medium": "https://images.pexels.com/photos/9/eiffel.jpeg" }, "alt": "Eiffel Tower" },
            { "src": {}, "alt": "Eiffel Tower without a file" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let provider =
        PexelsProvider::with_base_url(client(), "pexels-key", TIMEOUT, &server.uri()).unwrap();
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://images.pexels.com/photos/9/eiffel.jpeg");
}

#[tokio::test]
async fn pexels_timeout_degrades_to_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "photos": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let provider = PexelsProvider::with_base_url(
        client(),
        "pexels-key",
        Duration::from_millis(100),
        &server.uri(),
    )
    .unwrap();
    let evaluator = RelevanceEvaluator::default();

    let err = provider.search(&eiffel(), &evaluator).await.unwrap_err();
    assert!(matches!(err, ImageError::Http(_)));
    assert!(search_isolated(&provider, &eiffel(), &evaluator)
        .await
        .is_empty());
}

#[tokio::test]
async fn malformed_payload_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider =
        PexelsProvider::with_base_url(client(), "pexels-key", TIMEOUT, &server.uri()).unwrap();
    let err = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Deserialize { .. }));
}

// ---------------------------------------------------------------------------
// Generic search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn google_image_search_maps_items() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [
            {
                "link": "https://upload.wikimedia.org/eiffel-tower.jpg",
                "title": "Eiffel Tower - Wikipedia",
                "snippet": "The Eiffel Tower seen from the Champ de Mars"
            },
            { "link": "/relative/eiffel.jpg", "title": "Eiffel Tower" },
            { "title": "Eiffel Tower without link" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "google-key"))
        .and(query_param("cx", "engine-id"))
        .and(query_param("q", "Eiffel Tower"))
        .and(query_param("searchType", "image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let provider = GoogleImageProvider::with_base_url(
        client(),
        "google-key",
        "engine-id",
        TIMEOUT,
        &server.uri(),
    )
    .unwrap();
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].title, "Eiffel Tower - Wikipedia");
    assert_eq!(images[0].source, ProviderTag::GoogleSearch);
}

#[tokio::test]
async fn google_error_url_does_not_leak_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = GoogleImageProvider::with_base_url(
        client(),
        "google-secret",
        "engine-id",
        TIMEOUT,
        &server.uri(),
    )
    .unwrap();
    let err = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("google-secret"));
}

#[tokio::test]
async fn google_timeout_does_not_leak_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let provider = GoogleImageProvider::with_base_url(
        client(),
        "google-secret",
        "engine-id",
        Duration::from_millis(200),
        &server.uri(),
    )
    .unwrap();
    let err = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Http(_)));
    assert!(!err.to_string().contains("google-secret"));
    assert!(!format!("{err:?}").contains("google-secret"));
}

#[tokio::test]
async fn bing_image_search_uses_subscription_header() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "value": [
            { "contentUrl": "https://cdn.example.org/eiffel-tower-sunset.jpg", "name": "Sunset" },
            { "contentUrl": "https://cdn.example.org/notre-dame.jpg", "name": "Notre Dame" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/v7.0/images/search"))
        .and(query_param("q", "Eiffel Tower"))
        .and(query_param("count", "10"))
        .and(header("Ocp-Apim-Subscription-Key", "bing-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let provider =
        BingImageProvider::with_base_url(client(), "bing-key", TIMEOUT, &server.uri()).unwrap();
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://cdn.example.org/eiffel-tower-sunset.jpg");
}

// ---------------------------------------------------------------------------
// Wikipedia
// ---------------------------------------------------------------------------

fn wiki_provider(server: &MockServer, timeouts: SearchTimeouts) -> WikipediaProvider {
    WikipediaProvider::with_endpoints(
        client(),
        &[
            format!("{}/zh/w/api.php", server.uri()),
            format!("{}/en/w/api.php", server.uri()),
        ],
        timeouts,
    )
    .unwrap()
}

async fn mount_english_eiffel_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/en/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "Eiffel Tower"))
        .and(query_param("srlimit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "search": [
                { "pageid": 42, "title": "Eiffel Tower" },
                { "pageid": 43, "title": "Champ de Mars" }
            ]}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/w/api.php"))
        .and(query_param("pageids", "42"))
        .and(query_param("prop", "pageimages|images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "pages": { "42": {
                "pageid": 42,
                "title": "Eiffel Tower",
                "thumbnail": {
                    "source": "https://upload.wikimedia.org/wikipedia/commons/thumb/a/a8/Tour_Eiffel.jpg/320px-Tour_Eiffel.jpg"
                },
                "images": [
                    { "title": "File:Flag of France.svg" },
                    { "title": "File:Paris logo.png" },
                    { "title": "File:Eiffel Tower at night.jpg" },
                    { "title": "File:Champ de Mars.jpg" }
                ]
            }}}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/w/api.php"))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", "File:Eiffel Tower at night.jpg"))
        .and(query_param("iiurlwidth", "800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "pages": { "-1": {
                "title": "File:Eiffel Tower at night.jpg",
                "imageinfo": [{
                    "url": "https://upload.wikimedia.org/wikipedia/commons/e/e1/Eiffel_Tower_at_night.jpg",
                    "thumburl": "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e1/Eiffel_Tower_at_night.jpg/800px-Eiffel_Tower_at_night.jpg"
                }]
            }}}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/w/api.php"))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", "File:Champ de Mars.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "pages": { "-1": {
                "title": "File:Champ de Mars.jpg",
                "imageinfo": [{ "url": "https://upload.wikimedia.org/wikipedia/commons/c/c0/Champ_de_Mars.jpg" }]
            }}}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn wikipedia_falls_back_to_secondary_language() {
    let server = MockServer::start().await;

    // Primary edition answers with an unrelated page title.
    Mock::given(method("GET"))
        .and(path("/zh/w/api.php"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "search": [{ "pageid": 1, "title": "巴黎" }] }
        })))
        .mount(&server)
        .await;
    mount_english_eiffel_pages(&server).await;

    let provider = wiki_provider(&server, SearchTimeouts::default());
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://upload.wikimedia.org/wikipedia/commons/thumb/a/a8/Tour_Eiffel.jpg/800px-Tour_Eiffel.jpg",
            "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e1/Eiffel_Tower_at_night.jpg/800px-Eiffel_Tower_at_night.jpg",
        ]
    );
    assert_eq!(images[0].title, "Eiffel Tower");
    assert_eq!(images[1].title, "Eiffel Tower at night.jpg");
    assert!(images.iter().all(|i| i.source == ProviderTag::Wikipedia));
    assert!(images.iter().all(|i| i.description.is_empty()));
}

#[tokio::test]
async fn wikipedia_primary_timeout_still_tries_secondary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zh/w/api.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "query": { "search": [] } }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    mount_english_eiffel_pages(&server).await;

    let timeouts = SearchTimeouts {
        search: Duration::from_millis(300),
        ..SearchTimeouts::default()
    };
    let provider = wiki_provider(&server, timeouts);
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
}

#[tokio::test]
async fn wikipedia_relevant_primary_skips_secondary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zh/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "西湖"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "search": [{ "pageid": 7, "title": "西湖" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zh/w/api.php"))
        .and(query_param("pageids", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "pages": { "7": {
                "pageid": 7,
                "title": "西湖",
                "original": { "source": "https://upload.wikimedia.org/wikipedia/commons/0/01/%E8%A5%BF%E6%B9%96.jpg" }
            }}}
        })))
        .mount(&server)
        .await;
    Mock::given(path("/en/w/api.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider = wiki_provider(&server, SearchTimeouts::default());
    let images = provider
        .search(&PlaceQuery::new("西湖"), &RelevanceEvaluator::default())
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(
        images[0].url,
        "https://upload.wikimedia.org/wikipedia/commons/0/01/%E8%A5%BF%E6%B9%96.jpg"
    );
}

#[tokio::test]
async fn wikipedia_with_no_relevant_pages_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "search": [{ "pageid": 5, "title": "Louvre" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("pageids", "5"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider = wiki_provider(&server, SearchTimeouts::default());
    let images = provider
        .search(&eiffel(), &RelevanceEvaluator::default())
        .await
        .unwrap();
    assert!(images.is_empty());
}
