mod common;

use ipmes_client::http::{Method, RequestBody, ScriptedResponse};
use ipmes_client::workflow::PhotoGallery;
use ipmes_core::domain::{DocumentId, PaymentRequestId, ProjectId};
use ipmes_core::optimistic::RollbackSource;
use serde_json::json;

use common::{photo, signed_in};

const PHOTOS: &str = "/documents/payment-request/5";
const REORDER: &str = "/documents/reorder";

fn ids(photos: &[ipmes_core::domain::document::Document]) -> Vec<i64> {
    photos.iter().map(|photo| photo.document_id.0).collect()
}

/// Photos A=11, B=12, C=13 in that order, plus an invoice and a milestone
/// photo that do not belong in the gallery.
fn initial_listing() -> ScriptedResponse {
    ScriptedResponse::json(
        200,
        json!([
            photo(13, 2, "photo_payment"),
            photo(11, 0, "photo_payment"),
            photo(90, 0, "invoice"),
            photo(95, 0, "photo_milestone"),
            photo(12, 1, "photo_payment"),
        ]),
    )
}

async fn gallery() -> (PhotoGallery, ipmes_client::http::ScriptedTransport) {
    let (api, transport, _session) = signed_in(10, &["document.update"]);
    transport.on(Method::Get, PHOTOS, initial_listing());
    let gallery = PhotoGallery::load(api, PaymentRequestId(5)).await.expect("loads");
    (gallery, transport)
}

#[tokio::test]
async fn load_keeps_only_photos_in_display_order() {
    let (gallery, _transport) = gallery().await;
    assert_eq!(ids(&gallery.photos().await), vec![11, 12, 13]);
}

#[tokio::test]
async fn moving_last_photo_to_front_persists_new_orders() {
    let (gallery, transport) = gallery().await;
    transport.on(Method::Put, REORDER, ScriptedResponse::empty(204));

    gallery.reorder(2, 0).await.expect("persisted");

    assert_eq!(ids(&gallery.photos().await), vec![13, 11, 12]);
    let put = transport
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Put)
        .expect("reorder call");
    assert_eq!(put.path, REORDER);
    assert_eq!(
        put.body,
        RequestBody::Json(json!([
            { "documentId": 13, "displayOrder": 0 },
            { "documentId": 11, "displayOrder": 1 },
            { "documentId": 12, "displayOrder": 2 },
        ]))
    );
}

#[tokio::test]
async fn plain_text_confirmation_keeps_the_new_order() {
    let (gallery, transport) = gallery().await;
    transport.on(
        Method::Put,
        REORDER,
        ScriptedResponse::bytes(200, "text/plain", None, b"Photos reordered".to_vec()),
    );

    gallery.reorder(2, 0).await.expect("2xx persists the order");

    assert_eq!(ids(&gallery.photos().await), vec![13, 11, 12]);
    assert_eq!(transport.count(Method::Get, PHOTOS), 1);
}

#[tokio::test]
async fn failed_persist_restores_the_server_order() {
    let (gallery, transport) = gallery().await;
    transport.on(
        Method::Put,
        REORDER,
        ScriptedResponse::json(500, json!({ "message": "Could not save photo order" })),
    );
    transport.on(
        Method::Get,
        PHOTOS,
        ScriptedResponse::json(
            200,
            json!([
                photo(12, 0, "photo_payment"),
                photo(11, 1, "photo_payment"),
                photo(13, 2, "photo_payment"),
            ]),
        ),
    );

    let failure = gallery.reorder(2, 0).await.expect_err("server refused");

    assert_eq!(failure.restored_from, Some(RollbackSource::Server));
    assert!(failure.refetch_error.is_none());
    assert_eq!(failure.notice().message, "Could not save photo order");
    assert_eq!(ids(&gallery.photos().await), vec![12, 11, 13]);
}

#[tokio::test]
async fn failed_persist_and_failed_reload_fall_back_to_snapshot() {
    let (gallery, transport) = gallery().await;
    transport.on(Method::Put, REORDER, ScriptedResponse::unreachable());
    transport.on(Method::Get, PHOTOS, ScriptedResponse::empty(502));

    let failure = gallery.reorder(0, 2).await.expect_err("offline");

    assert_eq!(failure.restored_from, Some(RollbackSource::Snapshot));
    assert!(failure.refetch_error.is_some());
    assert!(failure.notice().message.contains("Request failed with status 502"));
    assert_eq!(ids(&gallery.photos().await), vec![11, 12, 13]);
}

#[tokio::test]
async fn out_of_range_move_sends_nothing() {
    let (gallery, transport) = gallery().await;

    let failure = gallery.reorder(0, 3).await.expect_err("no index 3");

    assert!(failure.restored_from.is_none());
    assert_eq!(transport.count(Method::Put, REORDER), 0);
    assert_eq!(ids(&gallery.photos().await), vec![11, 12, 13]);
}

#[tokio::test]
async fn setting_cover_reloads_gallery() {
    let (gallery, transport) = gallery().await;
    transport.on(Method::Put, "/projects/3/cover-photo", ScriptedResponse::empty(204));
    transport.on(Method::Get, PHOTOS, initial_listing());

    gallery.set_cover(ProjectId(3), DocumentId(12)).await.expect("cover set");

    let cover = transport
        .requests()
        .into_iter()
        .find(|request| request.path == "/projects/3/cover-photo")
        .expect("cover call");
    assert_eq!(cover.body, RequestBody::Json(json!({ "documentId": 12 })));
    assert_eq!(transport.count(Method::Get, PHOTOS), 2);
}
