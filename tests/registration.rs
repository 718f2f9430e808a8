#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use clap::Parser;
use common::get_json;
use tiler_extensions::server::{build_factory, build_router};
use tiler_extensions::{
    Config, DatasetPathParams, Error, StacExtension, TilerFactory, ValidateExtension,
};

#[test]
fn extensions_share_the_factory_prefix_and_dependency() {
    let mut factory = TilerFactory::new("/raster/", DatasetPathParams::new());
    factory.register(&ValidateExtension::default()).unwrap();
    factory.register(&StacExtension::default()).unwrap();

    let paths: Vec<String> = factory
        .routes()
        .iter()
        .map(|route| factory.url_for(route.path))
        .collect();
    assert_eq!(paths, ["/raster/validate", "/raster/stac"]);
    assert!(factory.routes().iter().all(|route| route.params[0].name == "url"));
}

#[test]
fn missing_capabilities_leave_no_routes() {
    let mut factory = TilerFactory::new("/cog", DatasetPathParams::new());

    let validate = factory.register(&ValidateExtension::default().without_validator());
    let stac = factory.register(&StacExtension::default().without_synthesizer());

    assert!(matches!(
        validate,
        Err(Error::MissingDependency {
            dependency: "cogeo",
            ..
        })
    ));
    assert!(matches!(
        stac,
        Err(Error::MissingDependency {
            dependency: "stac",
            ..
        })
    ));
    assert!(factory.routes().is_empty());
}

#[test]
fn registering_twice_is_a_route_conflict() {
    let mut factory = TilerFactory::new("/cog", DatasetPathParams::new());
    factory.register(&StacExtension::default()).unwrap();

    let err = factory.register(&StacExtension::default()).unwrap_err();

    assert!(matches!(err, Error::RouteConflict { ref path, .. } if path == "/cog/stac"));
    assert_eq!(factory.routes().len(), 1);
}

#[test]
fn config_flags_select_extensions() {
    let config = Config::try_parse_from(["tiler-extensions", "--disable-validate"]).unwrap();
    let factory = build_factory(&config).unwrap();

    let names: Vec<&str> = factory.routes().iter().map(|route| route.path).collect();
    assert_eq!(names, ["/stac"]);
}

#[tokio::test]
async fn route_index_lists_query_schemas() {
    let config = Config::try_parse_from(["tiler-extensions"]).unwrap();
    let router = build_router(build_factory(&config).unwrap());

    let (status, index) = get_json(router, "/api").await;

    assert_eq!(status, StatusCode::OK);
    let routes = index.as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["path"], "/cog/validate");
    assert_eq!(routes[0]["response"], "Info");
    assert_eq!(routes[1]["path"], "/cog/stac");
    assert_eq!(routes[1]["response"], "Item");

    let stac_query = &routes[1]["query"];
    assert_eq!(stac_query["required"], serde_json::json!(["url"]));
    assert_eq!(
        stac_query["properties"]["max_size"]["default"],
        serde_json::json!(1024)
    );
    assert!(
        stac_query["properties"]["asset_media_type"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .any(|value| value == "auto")
    );
}
