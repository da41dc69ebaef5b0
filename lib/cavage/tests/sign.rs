use cavage::ring::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA512};
use http::{header::DATE, Method, Request, Uri};
use proptest::proptest;

mod data;

#[tokio::test]
async fn signed_get_round_trips() {
    let key_pair = data::get_private_key();
    let public_key = UnparsedPublicKey::new(
        &RSA_PKCS1_2048_8192_SHA512,
        key_pair.public().as_ref().to_vec(),
    );

    let signed = cavage::easy::sign(data::get_request(), "Test", key_pair)
        .await
        .unwrap();

    assert!(signed.headers().contains_key(DATE));

    let header = signed.headers()["signature"].to_str().unwrap();
    let signature_header = cavage::header::parse(header).unwrap();

    assert_eq!(signature_header.key_id, "Test");
    assert_eq!(signature_header.algorithm, Some(cavage::ALGORITHM));
    assert_eq!(
        signature_header.headers.clone().collect::<Vec<_>>(),
        ["(request-target)", "host", "date"]
    );

    let signature_string =
        cavage::signature_string::construct(&signed, &signature_header).unwrap();
    let raw_signature = base64_simd::STANDARD
        .decode_to_vec(signature_header.signature)
        .unwrap();

    public_key
        .verify(signature_string.as_bytes(), &raw_signature)
        .unwrap();
}

#[tokio::test]
async fn signed_post_covers_digest() {
    let signed = cavage::easy::sign(data::post_request(), "Test", data::get_private_key())
        .await
        .unwrap();

    let header = signed.headers()["signature"].to_str().unwrap();
    let signature_header = cavage::header::parse(header).unwrap();

    assert_eq!(
        signature_header.headers.collect::<Vec<_>>(),
        ["(request-target)", "host", "date", "digest"]
    );
}

#[tokio::test]
async fn post_without_digest_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/foo"))
        .header("Host", "example.com")
        .body(())
        .unwrap();

    let result = cavage::easy::sign(request, "Test", data::get_private_key()).await;
    assert!(matches!(
        result,
        Err(cavage::easy::Error::SignatureStringConstruction(_))
    ));
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(Uri::from_static("/foo"))
        .header("Host", "example.com")
        .body(())
        .unwrap();

    let result = cavage::easy::sign(request, "Test", data::get_private_key()).await;
    assert!(matches!(
        result,
        Err(cavage::easy::Error::UnsupportedHttpMethod)
    ));
}

#[test]
fn reordering_covered_headers_changes_signature_string() {
    let request = data::post_request();

    let ordered = cavage::header::parse(
        r#"keyId="Test",headers="(request-target) host date digest",signature="x""#,
    )
    .unwrap();
    let reordered = cavage::header::parse(
        r#"keyId="Test",headers="(request-target) digest date host",signature="x""#,
    )
    .unwrap();

    let first = cavage::signature_string::construct(&request, &ordered).unwrap();
    let second = cavage::signature_string::construct(&request, &reordered).unwrap();

    assert_ne!(first, second);
}

proptest! {
    #[test]
    fn signature_string_is_deterministic(date_value in "[!-~][ -~]{0,48}[!-~]") {
        let request = Request::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/foo?param=value"))
            .header("Host", "example.com")
            .header("Date", date_value.as_str())
            .body(())
            .unwrap();
        let signature_header = cavage::header::parse(
            r#"keyId="Test",headers="(request-target) host date",signature="x""#,
        )
        .unwrap();

        let first = cavage::signature_string::construct(&request, &signature_header).unwrap();
        let second = cavage::signature_string::construct(&request, &signature_header).unwrap();

        assert_eq!(first, second);
    }
}
