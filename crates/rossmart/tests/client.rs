use bytes::Bytes;
use core::convert::Infallible;
use http::{header::DATE, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::json;
use tower::service_fn;

mod data;

#[tokio::test]
async fn handshake_is_signed() {
    let mock = service_fn(|req: Request<Full<Bytes>>| async move {
        assert_eq!(req.method(), Method::GET);
        assert_eq!(
            req.uri().path_and_query().unwrap().as_str(),
            "/paye-employers/v1/rest/handshake?softwareUsed=internal&softwareVersion=1&employerRegistrationNumber=8000278TH"
        );
        assert_eq!(req.headers()["host"], "softwaretest.ros.ie");
        assert!(req.headers().contains_key(DATE));

        let signature_header = req.headers()["signature"].to_str().unwrap().to_owned();
        let parsed = cavage::header::parse(&signature_header).unwrap();
        assert_eq!(parsed.key_id, data::EXPECTED_KEY_ID);
        assert_eq!(parsed.algorithm, Some("rsa-sha512"));
        assert_eq!(
            parsed.headers.collect::<Vec<_>>(),
            ["(request-target)", "host", "date"]
        );

        Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(r#"{"status":"up"}"#))))
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    let body = client.handshake().await.unwrap();
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn query_parameters_keep_insertion_order() {
    let mock = service_fn(|req: Request<Full<Bytes>>| async move {
        assert_eq!(
            req.uri().path_and_query().unwrap().as_str(),
            "/paye-employers/v1/rest/path?softwareUsed=internal&softwareVersion=1&a=1&b=2"
        );

        let signature_header = req.headers()["signature"].to_str().unwrap().to_owned();
        let parsed = cavage::header::parse(&signature_header).unwrap();
        let signature_string = cavage::signature_string::construct(&req, &parsed).unwrap();
        assert!(signature_string.starts_with(
            "(request-target): get /paye-employers/v1/rest/path?softwareUsed=internal&softwareVersion=1&a=1&b=2\n"
        ));

        Ok::<_, Infallible>(Response::new(Full::new(Bytes::from("{}"))))
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    client.get("/path", &[("a", "1"), ("b", "2")]).await.unwrap();
}

#[tokio::test]
async fn repeated_query_keys_are_preserved() {
    let mock = service_fn(|req: Request<Full<Bytes>>| async move {
        assert_eq!(
            req.uri().path_and_query().unwrap().as_str(),
            "/paye-employers/v1/rest/rpn/8000278TH/2018?softwareUsed=internal&softwareVersion=1&employeeIDs=7009613EA-0&employeeIDs=7064924JA-0"
        );

        Ok::<_, Infallible>(Response::new(Full::new(Bytes::from("{}"))))
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    client
        .lookup_rpn_by_employer(None, &["7009613EA-0", "7064924JA-0"])
        .await
        .unwrap();
}

#[tokio::test]
async fn post_carries_digest_over_the_exact_body() {
    let payload = json!({"a": 1});
    let expected_body = serde_json::to_vec(&payload).unwrap();
    let expected_digest = rossmart::digest::compute(&expected_body);

    let mock = service_fn(move |req: Request<Full<Bytes>>| {
        let expected_body = expected_body.clone();
        let expected_digest = expected_digest.clone();

        async move {
            assert_eq!(req.method(), Method::POST);
            assert_eq!(
                req.headers()["content-type"],
                "application/json;charset=UTF-8"
            );
            assert_eq!(req.headers()["digest"], expected_digest.as_str());

            let signature_header = req.headers()["signature"].to_str().unwrap().to_owned();
            let parsed = cavage::header::parse(&signature_header).unwrap();
            assert_eq!(
                parsed.headers.collect::<Vec<_>>(),
                ["(request-target)", "host", "date", "digest"]
            );

            let body = req.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(body.as_ref(), expected_body.as_slice());

            Ok::<_, Infallible>(Response::new(Full::new(Bytes::from("{}"))))
        }
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    client.post("/path", &[], &payload).await.unwrap();
}

#[tokio::test]
async fn forbidden_surfaces_an_authentication_error() {
    let mock = service_fn(|_req: Request<Full<Bytes>>| async move {
        let response = Response::builder()
            .status(StatusCode::FORBIDDEN)
            .body(Full::new(Bytes::from(
                r#"{"validationErrors":[{"code":"4001","message":"Duplicate"}]}"#,
            )))
            .unwrap();

        Ok::<_, Infallible>(response)
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    let payload = json!({"a": 1});
    let error = client.post("/path", &[], &payload).await.unwrap_err();
    let rossmart::Error::Authentication(api_error) = error else {
        panic!("expected an authentication error");
    };

    assert_eq!(api_error.status, StatusCode::FORBIDDEN);
    assert_eq!(api_error.validation_errors("4001").len(), 1);
    assert_eq!(api_error.validation_errors("4001")[0].message, "Duplicate");
    assert!(api_error.validation_errors("9999").is_empty());
    assert_eq!(api_error.payload, Some(payload));
}

#[tokio::test]
async fn server_error_surfaces_an_api_error() {
    let mock = service_fn(|_req: Request<Full<Bytes>>| async move {
        let response = Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::from("upstream exploded")))
            .unwrap();

        Ok::<_, Infallible>(response)
    });

    let (builder, _files) = data::builder();
    let client = builder.service(mock).unwrap();

    let error = client.get("/handshake", &[]).await.unwrap_err();
    let rossmart::Error::Api(api_error) = error else {
        panic!("expected an API error");
    };

    assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_error.body, "upstream exploded");
    assert!(api_error.validation_errors.is_empty());
}

#[test]
fn garbage_private_key_is_a_signing_error() {
    let mock = service_fn(|_req: Request<Full<Bytes>>| async move {
        Ok::<_, Infallible>(Response::new(Full::<Bytes>::default()))
    });

    let [public, private] = data::key_files();
    std::fs::write(private.path(), "not a key").unwrap();

    let result = rossmart::Client::builder()
        .public_key_path(public.path())
        .private_key_path(private.path())
        .password("Password123")
        .employer_registration_number("8000278TH")
        .tax_year("2018")
        .service(mock);

    assert!(matches!(result, Err(rossmart::Error::Signing(..))));
}

#[test]
fn password_and_hashed_password_are_mutually_exclusive() {
    let mock = service_fn(|_req: Request<Full<Bytes>>| async move {
        Ok::<_, Infallible>(Response::new(Full::<Bytes>::default()))
    });

    let files = data::key_files();
    let result = rossmart::Client::builder()
        .public_key_path(files[0].path())
        .private_key_path(files[1].path())
        .password("Password123")
        .hashed_password("QvdJref54ZW/R183pEyvyw==")
        .employer_registration_number("8000278TH")
        .tax_year("2018")
        .service(mock);

    assert!(matches!(
        result,
        Err(rossmart::Error::Credential(
            rossmart::credential::Error::Conflicting
        ))
    ));
}
