//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock vendor servers and drive the
//! real HTTP fetch client through full crawl runs.

use std::sync::Arc;
use std::time::Duration;

use firmware_crawler::config::{load_config, UserAgentConfig};
use firmware_crawler::crawler::{Fetcher, HttpFetcher, Politeness, PolitenessOverrides};
use firmware_crawler::extract::html::Document;
use firmware_crawler::extract::{TraversalOutcome, TraversalRequest, VendorModule};
use firmware_crawler::record::FirmwareRecord;
use firmware_crawler::sink::{CollectingSink, JsonLinesSink};
use firmware_crawler::vendors::avm::{self, AvmEndpoints};
use firmware_crawler::vendors::{self, dlink};
use firmware_crawler::RawMetadata;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> Arc<dyn Fetcher> {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    Arc::new(HttpFetcher::new(&user_agent).expect("Failed to build HTTP client"))
}

/// Fast settings so tests do not wait on pacing
fn fast_politeness() -> Politeness {
    Politeness {
        concurrent_requests: 2,
        download_delay: Duration::from_millis(5),
        jitter_min: Duration::ZERO,
        jitter_max: Duration::ZERO,
        obey_robots: true,
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn firmware_table(base_url: &str, version: &str, date: &str, file: &str) -> String {
    format!(
        r#"<html><body>
        <select id="supportRevision"><option value="A1">A1</option><option value="B1">B1</option></select>
        <div id="firmware"><table><tr>
          <td data-table-header="Version">{}</td>
          <td data-table-header="Datum">{}</td>
          <td data-table-header=""><a href="{}{}">Download</a></td>
        </tr></table></div>
        </body></html>"#,
        version, date, base_url, file
    )
}

/// Mounts a two-product D-Link style catalogue on `server`
async fn mount_dlink_catalogue(server: &MockServer) {
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/de/de/for-home/wifi"))
        .respond_with(html(format!(
            r#"<a href="{0}/de/de/products/dir-842"><div class="product-item__number">DIR-842</div></a>
               <a href="{0}/de/de/products/covr-1102"><div class="product-item__number">COVR-1102</div></a>
               <a href="{0}/de/de/support">Support</a>"#,
            base_url
        )))
        .mount(server)
        .await;

    for (product, version, date, file) in [
        ("dir-842", "1.02B03", "15.02.2024", "/dir/dir-842/fw_1-02.zip"),
        ("covr-1102", "1.10", "03.11.2023", "/covr/covr-1102/fw_1-10.zip"),
    ] {
        // The same page serves every revision; the request context decides
        // whether the step re-requests or extracts.
        Mock::given(method("GET"))
            .and(path(format!("/de/de/products/{}", product)))
            .respond_with(html(firmware_table(&base_url, version, date, file)))
            .mount(server)
            .await;
    }
}

fn sorted(mut records: Vec<FirmwareRecord>) -> Vec<FirmwareRecord> {
    records.sort_by(|a, b| a.device_name().cmp(b.device_name()));
    records
}

#[tokio::test]
async fn test_listing_to_detail_records() {
    let server = MockServer::start().await;
    mount_dlink_catalogue(&server).await;

    let module = dlink::build(
        [format!("{}/de/de/for-home/wifi", server.uri())],
        Vec::<String>::new(),
    );
    let mut sink = CollectingSink::new();
    let summary = vendors::run_module(
        module,
        test_fetcher(),
        &fast_politeness(),
        &PolitenessOverrides::default(),
        "TestBot",
        &mut sink,
    )
    .await;

    let records = sorted(sink.records());
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].vendor(), "DLink");
    assert_eq!(records[0].device_name(), "COVR-1102 B1");
    assert_eq!(records[0].device_class(), "Router (Home)");
    assert_eq!(records[0].release_date_string(), "03-11-2023");

    assert_eq!(records[1].device_name(), "DIR-842 B1");
    assert_eq!(records[1].firmware_version(), "1.02B03");
    assert_eq!(
        records[1].file_urls(),
        vec![format!("{}/dir/dir-842/fw_1-02.zip", server.uri())]
    );

    // listing + 2 product pages + 2 revision pages
    assert_eq!(summary.dispatched, 5);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.robots_denied, 0);
}

#[tokio::test]
async fn test_records_written_as_json_lines() {
    let server = MockServer::start().await;
    mount_dlink_catalogue(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("out").join("records.jsonl");

    let module = dlink::build(
        [format!("{}/de/de/for-home/wifi", server.uri())],
        Vec::<String>::new(),
    );
    let mut sink = JsonLinesSink::open(&records_path).await.unwrap();
    vendors::run_module(
        module,
        test_fetcher(),
        &fast_politeness(),
        &PolitenessOverrides::default(),
        "TestBot",
        &mut sink,
    )
    .await;
    assert_eq!(sink.written(), 2);

    let content = std::fs::read_to_string(&records_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let mut dates: Vec<String> = lines
        .iter()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["release_date"].as_str().unwrap().to_string()
        })
        .collect();
    dates.sort();
    assert_eq!(dates, vec!["03-11-2023".to_string(), "15-02-2024".to_string()]);

    let parsed: FirmwareRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(parsed.vendor(), "DLink");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MirrorStep {
    Index,
    Firmware,
}

/// A vendor whose index links to firmware pages carrying a version header
fn mirror_module(index_url: String) -> VendorModule<MirrorStep> {
    VendorModule::new("mirror")
        .seed(TraversalRequest::new(index_url, MirrorStep::Index))
        .step(MirrorStep::Index, |response, _ctx| {
            let base = match url::Url::parse(&response.url) {
                Ok(base) => base,
                Err(_) => return TraversalOutcome::Empty,
            };
            let requests = Document::parse(&response.text())
                .links(&base)
                .into_iter()
                .map(|link| TraversalRequest::new(link, MirrorStep::Firmware))
                .collect();
            TraversalOutcome::NewRequests(requests)
        })
        .step(MirrorStep::Firmware, |response, _ctx| {
            let doc = Document::parse(&response.text());
            match doc.first_text("h1") {
                Some(version) => TraversalOutcome::Metadata(
                    RawMetadata::new()
                        .vendor("Mirror")
                        .device_name("Box")
                        .device_class("Router")
                        .firmware_version(version)
                        .release_date("01-01-2024")
                        .file_urls([response.url.clone()]),
                ),
                None => TraversalOutcome::Empty,
            }
        })
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/public/fw">Public</a><a href="/private/fw">Private</a>"#.to_string(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public/fw"))
        .respond_with(html("<h1>2.0</h1>".to_string()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/fw"))
        .respond_with(html("<h1>9.9</h1>".to_string()))
        .expect(0)
        .mount(&server)
        .await;

    let mut sink = CollectingSink::new();
    let summary = vendors::run_module(
        mirror_module(format!("{}/", base_url)),
        test_fetcher(),
        &fast_politeness(),
        &PolitenessOverrides::default(),
        "TestBot",
        &mut sink,
    )
    .await;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].firmware_version(), "2.0");
    assert_eq!(summary.robots_denied, 1);
    assert_eq!(summary.dispatched, 3);
}

#[tokio::test]
async fn test_robots_ignored_when_overridden() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/fw">Firmware</a>"#.to_string()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fw"))
        .respond_with(html("<h1>1.0</h1>".to_string()))
        .mount(&server)
        .await;

    let mut sink = CollectingSink::new();
    let summary = vendors::run_module(
        mirror_module(format!("{}/", server.uri())),
        test_fetcher(),
        &fast_politeness(),
        &PolitenessOverrides::default().obey_robots(false),
        "TestBot",
        &mut sink,
    )
    .await;

    assert_eq!(sink.len(), 1);
    assert_eq!(summary.robots_denied, 0);
}

fn listing(entries: &[(&str, &str)]) -> ResponseTemplate {
    let body: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, kind)| json!({"filename": name, "filetype": kind, "linktarget": null}))
        .collect();
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount_listing(server: &MockServer, at: &str, entries: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(listing(entries))
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, product: &str, info: &str) {
    let root = format!("/fritzbox/{}", product);
    mount_listing(server, &format!("{}/", root), &[("deutschland", "d")]).await;
    mount_listing(server, &format!("{}/deutschland/", root), &[("fritz.os", "d")]).await;
    mount_listing(
        server,
        &format!("{}/deutschland/fritz.os/", root),
        &[("firmware.image", "-"), ("info_de.txt", "-")],
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/deutschland/fritz.os/info_de.txt", root)))
        .respond_with(ResponseTemplate::new(200).set_body_string(info.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_directory_tree_with_gone_folders_and_eol_products() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(&server, "/", &[("fritzbox", "d"), ("archive", "d"), ("..", "d")]).await;
    mount_listing(
        &server,
        "/fritzbox/",
        &[("fritzbox-7590", "d"), ("fritzbox-7490", "d"), ("fritzbox-6890", "d")],
    )
    .await;
    // fritzbox-6890 is listed but its folder is gone (404 from the mock server)

    mount_product(
        &server,
        "fritzbox-7590",
        "Produkt       : FRITZ!Box 7590\nVersion       : FRITZ!OS 07.57\nRelease-Datum : 05.10.2023\n",
    )
    .await;
    mount_product(
        &server,
        "fritzbox-7490",
        "Produkt       : FRITZ!Box 7490\nVersion       : FRITZ!OS 07.29\nRelease-Datum : 01.02.2022\n",
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/produkte/fritzbox/fritzbox-7590"))
        .respond_with(html("<h1>FRITZ!Box 7590</h1>".to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/produkte/fritzbox/fritzbox-7490"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let endpoints = AvmEndpoints {
        file_root: format!("{}/", base_url),
        product_base: format!("{}/produkte", base_url),
        verify_support: true,
    };
    let mut sink = CollectingSink::new();
    let summary = vendors::run_module(
        avm::module_with(endpoints, Vec::<String>::new()),
        test_fetcher(),
        &fast_politeness(),
        &PolitenessOverrides::default(),
        "TestBot",
        &mut sink,
    )
    .await;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.vendor(), "AVM");
    assert_eq!(record.device_name(), "FRITZ!Box 7590");
    assert_eq!(record.device_class(), "Router");
    assert_eq!(record.firmware_version(), "07.57");
    assert_eq!(record.release_date_string(), "05-10-2023");
    assert_eq!(
        record.file_urls(),
        vec![format!(
            "{}/fritzbox/fritzbox-7590/deutschland/fritz.os/firmware.image",
            base_url
        )]
    );

    // every 404 went to a step that handles it
    assert_eq!(summary.discarded, 0);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_config_layers_into_vendor_plan() {
    let content = r#"
[politeness]
concurrent-requests = 4
download-delay-ms = 200

[user-agent]
crawler-name = "FirmwareCrawler"
crawler-version = "0.1"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
records-path = "./records.jsonl"

[[vendor]]
name = "asus"
concurrent-requests = 1
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, content.as_bytes()).unwrap();

    let config = load_config(file.path()).unwrap();
    let global = config.politeness.to_politeness();
    let entry = config.vendor("asus").unwrap().overrides();

    let plan = vendors::plan("asus", &global, &entry).unwrap();
    assert_eq!(plan.politeness.concurrent_requests, 1);
    assert_eq!(plan.politeness.download_delay, Duration::from_millis(200));
    assert!(plan.politeness.obey_robots);

    let dlink_plan = vendors::plan("dlink", &global, &Default::default()).unwrap();
    assert_eq!(dlink_plan.politeness.concurrent_requests, 4);
    assert!(!dlink_plan.politeness.obey_robots);
}
