#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::StatusCode;
use common::{Fixture, get_json, query};
use serde_json::json;
use tiler_extensions::stac::{RasterItemSynthesizer, format_datetime};
use tiler_extensions::{
    DatasetPathParams, Item, ItemRequest, ItemSynthesizer, Result, StacExtension, TilerFactory,
};

/// Records every request and answers with a bare item
#[derive(Default)]
struct SpySynthesizer {
    calls: Mutex<Vec<ItemRequest>>,
}

impl ItemSynthesizer for SpySynthesizer {
    fn create_item(&self, request: &ItemRequest) -> Result<Item> {
        self.calls.lock().unwrap().push(request.clone());
        let mut item = Item::new("spy");
        item.properties = request.properties.clone();
        Ok(item)
    }
}

fn spy_router(spy: &Arc<SpySynthesizer>, path_dependency: DatasetPathParams) -> Router {
    let mut factory = TilerFactory::new("/cog", path_dependency);
    let synthesizer: Arc<dyn ItemSynthesizer> = spy.clone();
    factory
        .register(&StacExtension::new().with_synthesizer(synthesizer))
        .unwrap();
    factory.into_router()
}

fn raster_router() -> Router {
    let mut factory = TilerFactory::new("/cog", DatasetPathParams::new());
    let synthesizer = Arc::new(RasterItemSynthesizer::default());
    factory
        .register(&StacExtension::new().with_synthesizer(synthesizer))
        .unwrap();
    factory.into_router()
}

fn stac_uri(pairs: &[(&str, &str)]) -> String {
    format!("/cog/stac?{}", query(pairs))
}

#[tokio::test]
async fn invalid_media_type_never_reaches_the_synthesizer() {
    let spy = Arc::new(SpySynthesizer::default());

    let (status, body) = get_json(
        spy_router(&spy, DatasetPathParams::new()),
        &stac_uri(&[("url", "a.tif"), ("asset_media_type", "image/gif")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("asset_media_type"));
    assert!(spy.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_datetimes_never_reach_the_synthesizer() {
    let spy = Arc::new(SpySynthesizer::default());

    for datetime in ["2020-01-01/2020-01-02/2020-01-03", "2021-01-01/2020-01-01", "soon"] {
        let (status, _) = get_json(
            spy_router(&spy, DatasetPathParams::new()),
            &stac_uri(&[("url", "a.tif"), ("datetime", datetime)]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{datetime}");
    }
    assert!(spy.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn omitted_href_forwards_the_resolved_path() {
    let root = tempfile::tempdir().unwrap();
    let spy = Arc::new(SpySynthesizer::default());

    let (status, _) = get_json(
        spy_router(&spy, DatasetPathParams::with_root(root.path())),
        &stac_uri(&[("url", "scenes/a.tif")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let calls = spy.calls.lock().unwrap();
    let expected = root.path().join("scenes/a.tif").to_string_lossy().into_owned();
    assert_eq!(calls[0].path, expected);
    assert_eq!(calls[0].asset_href, expected);
}

#[tokio::test]
async fn request_is_forwarded_with_defaults_and_lists() {
    let spy = Arc::new(SpySynthesizer::default());

    let uri = stac_uri(&[
        ("url", "https://example.com/a.tif"),
        ("asset_roles", "data"),
        ("asset_roles", "visual"),
        ("with_eo", "false"),
        ("max_size", "256"),
        ("asset_media_type", "image/tiff; application=geotiff"),
        ("datetime", "2020-06-15T10:00:00"),
    ]);
    let (status, _) = get_json(spy_router(&spy, DatasetPathParams::new()), &uri).await;
    assert_eq!(status, StatusCode::OK);

    let calls = spy.calls.lock().unwrap();
    let request = &calls[0];
    assert_eq!(request.path, "https://example.com/a.tif");
    assert_eq!(request.asset_name, "data");
    assert_eq!(
        request.asset_roles,
        Some(vec!["data".to_string(), "visual".to_string()])
    );
    assert!(request.with_proj && request.with_raster && !request.with_eo);
    assert_eq!(request.raster_max_size.get(), 256);
    assert_eq!(
        request.input_datetime.map(|dt| format_datetime(&dt)).as_deref(),
        Some("2020-06-15T10:00:00Z")
    );
    assert!(request.properties.is_empty());
}

#[tokio::test]
async fn range_datetime_sets_start_and_end_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::cog(512).write(dir.path(), "scene.tif");

    let (status, item) = get_json(
        raster_router(),
        &stac_uri(&[
            ("url", path.to_str().unwrap()),
            ("datetime", "2020-01-01/2020-01-02"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{item}");
    let properties = &item["properties"];
    assert_eq!(properties["start_datetime"], "2020-01-01T00:00:00Z");
    assert_eq!(properties["end_datetime"], "2020-01-02T00:00:00Z");
    assert!(properties.get("datetime").is_none());
}

#[tokio::test]
async fn instant_datetime_is_utc_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::cog(512).write(dir.path(), "scene.tif");

    let (_, item) = get_json(
        raster_router(),
        &stac_uri(&[
            ("url", path.to_str().unwrap()),
            ("datetime", "2020-06-15T10:00:00"),
        ]),
    )
    .await;

    let properties = &item["properties"];
    assert_eq!(properties["datetime"], "2020-06-15T10:00:00Z");
    assert!(properties.get("start_datetime").is_none());
    assert!(properties.get("end_datetime").is_none());
}

#[tokio::test]
async fn raster_item_describes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::cog(1024)
        .with_nodata("0")
        .with_datetime("2021:03:04 05:06:07")
        .write(dir.path(), "S2_tile.B04.tif");

    let (status, item) = get_json(
        raster_router(),
        &stac_uri(&[
            ("url", path.to_str().unwrap()),
            ("collection", "sentinel"),
            ("collection_url", "https://example.com/collections/sentinel"),
            ("asset_roles", "data"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{item}");
    assert_eq!(item["type"], "Feature");
    assert_eq!(item["stac_version"], "1.0.0");
    assert_eq!(item["id"], "S2_tile");
    assert_eq!(item["collection"], "sentinel");
    assert_eq!(item["links"][0]["rel"], "collection");
    assert_eq!(item["bbox"], json!([-10.0, -10.0, 10.0, 10.0]));
    assert_eq!(item["geometry"]["type"], "Polygon");

    let properties = &item["properties"];
    assert_eq!(properties["datetime"], "2021-03-04T05:06:07Z");
    assert_eq!(properties["proj:epsg"], 4326);
    assert_eq!(properties["proj:shape"], json!([1024, 1024]));

    let extensions = item["stac_extensions"].as_array().unwrap();
    assert_eq!(extensions.len(), 3);

    let asset = &item["assets"]["data"];
    assert_eq!(asset["href"], path.to_string_lossy().as_ref());
    assert_eq!(
        asset["type"],
        "image/tiff; application=geotiff; profile=cloud-optimized"
    );
    assert_eq!(asset["roles"], json!(["data"]));
    assert_eq!(asset["eo:bands"], json!([{ "name": "b1" }]));

    let band = &asset["raster:bands"][0];
    assert_eq!(band["data_type"], "uint8");
    assert_eq!(band["nodata"], 0.0);
    let stats = &band["statistics"];
    assert_eq!(stats["minimum"], 10.0);
    assert_eq!(stats["maximum"], 30.0);
    assert!((stats["mean"].as_f64().unwrap() - 20.0).abs() < 1e-9, "{stats}");
    assert!((stats["stddev"].as_f64().unwrap() - 10.0).abs() < 1e-9, "{stats}");
    assert_eq!(stats["valid_percent"], 100.0);
}

#[tokio::test]
async fn projected_bounds_are_reprojected_to_wgs84() {
    let dir = tempfile::tempdir().unwrap();
    let path = Fixture::tiled(256)
        .with_epsg(Some(3857))
        .write(dir.path(), "mercator.tif");

    let (status, item) = get_json(
        raster_router(),
        &stac_uri(&[
            ("url", path.to_str().unwrap()),
            ("with_raster", "false"),
            ("with_eo", "false"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{item}");
    let bbox: Vec<f64> = item["bbox"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    // 100 km of web mercator is just under 0.9 degrees at the equator
    assert!((bbox[2] - 0.8983).abs() < 1e-3, "{bbox:?}");
    assert!((bbox[0] + bbox[2]).abs() < 1e-9, "{bbox:?}");
    assert_eq!(item["properties"]["proj:epsg"], 3857);
    assert_eq!(
        item["properties"]["proj:bbox"],
        json!([-100_000.0, -100_000.0, 100_000.0, 100_000.0])
    );
    assert_eq!(item["stac_extensions"].as_array().unwrap().len(), 1);
    assert!(item["assets"]["data"].get("raster:bands").is_none());
}

#[tokio::test]
async fn missing_source_is_not_found() {
    let (status, _) = get_json(
        raster_router(),
        &stac_uri(&[("url", "/no/such/scene.tif")]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
