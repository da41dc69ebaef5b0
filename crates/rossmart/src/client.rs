use crate::{
    credential, digest,
    error::{ApiError, BoxError, Error, Result},
    keys,
};
use bytes::Bytes;
use cavage::ring::signature::RsaKeyPair;
use http::{
    header::USER_AGENT, HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{error::Error as StdError, path::PathBuf, sync::Arc, time::Duration};
use tower::{
    layer::util::Identity,
    util::{BoxCloneSyncService, Either},
    Service, ServiceBuilder, ServiceExt,
};
use tower_http::timeout::TimeoutLayer;

type BoxBody<E = BoxError> = http_body_util::combinators::BoxBody<Bytes, E>;
type HttpService = BoxCloneSyncService<Request<Full<Bytes>>, Response<BoxBody>, BoxError>;

/// API root of the software-test environment
pub const TEST_ROOT: &str = "https://softwaretest.ros.ie/paye-employers/v1/rest";

/// API root of the production environment
pub const LIVE_ROOT: &str = "https://ros.ie/paye-employers/v1/rest";

/// Default request timeout of 30s
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_SOFTWARE_USED: &str = "internal";
const DEFAULT_SOFTWARE_VERSION: &str = "1";

/// API environment a client talks to, selected at construction
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Software-test environment
    Test,

    /// Production environment
    #[default]
    Live,
}

impl Endpoint {
    const fn root(self) -> &'static str {
        match self {
            Self::Test => TEST_ROOT,
            Self::Live => LIVE_ROOT,
        }
    }
}

/// Builder for the API client
pub struct ClientBuilder {
    endpoint: Endpoint,
    public_key_path: Option<PathBuf>,
    private_key_path: Option<PathBuf>,
    password: Option<String>,
    hashed_password: Option<String>,
    employer_registration_number: Option<String>,
    tax_year: Option<String>,
    software_used: String,
    software_version: String,
    agent_tain: Option<String>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Select the API environment
    #[must_use]
    pub fn endpoint(self, endpoint: Endpoint) -> Self {
        Self { endpoint, ..self }
    }

    /// Path to the armored public key file
    #[must_use]
    pub fn public_key_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            public_key_path: Some(path.into()),
            ..self
        }
    }

    /// Path to the armored private key file
    #[must_use]
    pub fn private_key_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: Some(path.into()),
            ..self
        }
    }

    /// Plaintext account password, run through the legacy credential transform
    ///
    /// Mutually exclusive with [`hashed_password`](Self::hashed_password)
    #[must_use]
    pub fn password(self, password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..self
        }
    }

    /// Pre-hashed password, used as the key passphrase verbatim
    ///
    /// Mutually exclusive with [`password`](Self::password)
    #[must_use]
    pub fn hashed_password(self, hashed_password: impl Into<String>) -> Self {
        Self {
            hashed_password: Some(hashed_password.into()),
            ..self
        }
    }

    /// Employer registration number requests are issued for
    #[must_use]
    pub fn employer_registration_number(self, number: impl Into<String>) -> Self {
        Self {
            employer_registration_number: Some(number.into()),
            ..self
        }
    }

    /// Tax year requests are scoped to
    #[must_use]
    pub fn tax_year(self, tax_year: impl Into<String>) -> Self {
        Self {
            tax_year: Some(tax_year.into()),
            ..self
        }
    }

    /// Software identifier reported on every request
    ///
    /// Defaults to `internal`
    #[must_use]
    pub fn software_used(self, software_used: impl Into<String>) -> Self {
        Self {
            software_used: software_used.into(),
            ..self
        }
    }

    /// Software version reported on every request
    ///
    /// Defaults to `1`
    #[must_use]
    pub fn software_version(self, software_version: impl Into<String>) -> Self {
        Self {
            software_version: software_version.into(),
            ..self
        }
    }

    /// TAIN of the agent filing on the employer's behalf
    #[must_use]
    pub fn agent_tain(self, agent_tain: impl Into<String>) -> Self {
        Self {
            agent_tain: Some(agent_tain.into()),
            ..self
        }
    }

    /// Set a timeout
    ///
    /// Defaults to 30s
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Build the client with the real HTTPS transport
    ///
    /// # Panics
    ///
    /// Panics if the native certificate store cannot be loaded
    pub fn build(self) -> Result<Client> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .expect("Failed to fetch native certificates")
            .https_only()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        let client = HyperClient::builder(TokioExecutor::new())
            .build(connector)
            .map_response(|response| {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, BoxBody::new(body))
            });

        self.service(client)
    }

    /// Build the client on top of another HTTP client service
    ///
    /// This is the seam tests hook a mock transport into.
    pub fn service<S, B>(self, client: S) -> Result<Client>
    where
        S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send + Sync + 'static,
        S::Error: StdError + Send + Sync + 'static,
        S::Future: Send,
        B: HttpBody<Data = Bytes> + Default + Send + Sync + 'static,
        B::Error: StdError + Send + Sync + 'static,
    {
        let passphrase = match (self.password, self.hashed_password) {
            (Some(..), Some(..)) => return Err(credential::Error::Conflicting.into()),
            (Some(password), None) => credential::derive(&password)?,
            (None, Some(hashed_password)) => hashed_password,
            (None, None) => return Err(credential::Error::Missing.into()),
        };

        let public_key_path = self
            .public_key_path
            .ok_or(Error::MissingParameter("public-key-path"))?;
        let private_key_path = self
            .private_key_path
            .ok_or(Error::MissingParameter("private-key-path"))?;

        let key_id = keys::public_key_identifier(&public_key_path)?;
        let private_key_pem = keys::private_key_material(&private_key_path)?;
        let signing_key =
            cavage::crypto::parse::private_key(&private_key_pem, &passphrase).map_err(Error::Signing)?;

        let timeout = self.timeout.map_or_else(
            || Either::Left(Identity::new()),
            |duration| Either::Right(TimeoutLayer::new(duration)),
        );

        let service = ServiceBuilder::new()
            .layer(timeout)
            .service(client)
            .map_response(|response: Response<B>| {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, BoxBody::new(body.map_err(BoxError::from)))
            })
            .map_err(BoxError::from);

        Ok(Client {
            inner: BoxCloneSyncService::new(service),
            default_headers: self.default_headers,
            endpoint: self.endpoint,
            key_id,
            signing_key: Arc::new(signing_key),
            software_used: self.software_used,
            software_version: self.software_version,
            agent_tain: self.agent_tain,
            employer_registration_number: self
                .employer_registration_number
                .ok_or(Error::MissingParameter("employer-registration-number"))?,
            tax_year: self.tax_year.ok_or(Error::MissingParameter("tax-year"))?,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        Self {
            endpoint: Endpoint::default(),
            public_key_path: None,
            private_key_path: None,
            password: None,
            hashed_password: None,
            employer_registration_number: None,
            tax_year: None,
            software_used: DEFAULT_SOFTWARE_USED.into(),
            software_version: DEFAULT_SOFTWARE_VERSION.into(),
            agent_tain: None,
            default_headers,
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

/// Signed-request client for the API
///
/// Key material and the derived passphrase are loaded once at construction and
/// shared immutably by all calls; the client is cheap to clone and safe to use
/// concurrently. Every call is a single HTTP exchange: it either returns the
/// parsed JSON payload or a structured error, nothing is retried.
#[derive(Clone)]
pub struct Client {
    inner: HttpService,
    default_headers: HeaderMap,
    endpoint: Endpoint,
    key_id: String,
    signing_key: Arc<RsaKeyPair>,
    software_used: String,
    software_version: String,
    agent_tain: Option<String>,
    employer_registration_number: String,
    tax_year: String,
}

impl Client {
    /// Return a builder for the client
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Employer registration number this client files under
    #[must_use]
    pub fn employer_registration_number(&self) -> &str {
        &self.employer_registration_number
    }

    /// Tax year this client's requests are scoped to
    #[must_use]
    pub fn tax_year(&self) -> &str {
        &self.tax_year
    }

    fn prepare_request(&self, mut request: Request<Full<Bytes>>) -> Request<Full<Bytes>> {
        request.headers_mut().extend(self.default_headers.clone());
        request
    }

    fn url_for(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let mut params = vec![
            ("softwareUsed", self.software_used.as_str()),
            ("softwareVersion", self.software_version.as_str()),
        ];
        if let Some(agent_tain) = self.agent_tain.as_deref() {
            params.push(("agentTain", agent_tain));
        }
        params.extend_from_slice(query);

        let query_string = serde_urlencoded::to_string(&params)?;
        Ok(format!("{}{path}?{query_string}", self.endpoint.root()))
    }

    /// Issue a signed GET request
    ///
    /// The fixed query parameters are put ahead of `query`; repeated keys keep
    /// their given order. A non-success response surfaces as an [`ApiError`]
    /// carrying the raw body and any validation errors parsed out of it.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url_for(path, query)?;
        let request = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .body(Full::default())?;

        self.dispatch(request, url, None).await
    }

    /// Issue a signed POST request carrying a JSON payload
    ///
    /// The payload is serialised once; the digest header is computed over the
    /// exact bytes that are transmitted and covered by the signature.
    pub async fn post(&self, path: &str, query: &[(&str, &str)], payload: &Value) -> Result<Value> {
        let url = self.url_for(path, query)?;
        let body = serde_json::to_vec(payload)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(
                http::header::CONTENT_TYPE,
                "application/json;charset=UTF-8",
            )
            .header(digest::DIGEST_HEADER_NAME.clone(), digest::compute(&body))
            .body(Full::new(Bytes::from(body)))?;

        self.dispatch(request, url, Some(payload.clone())).await
    }

    async fn dispatch(
        &self,
        request: Request<Full<Bytes>>,
        url: String,
        payload: Option<Value>,
    ) -> Result<Value> {
        let method = request.method().clone();
        let request = cavage::easy::sign(
            self.prepare_request(request),
            &self.key_id,
            Arc::clone(&self.signing_key),
        )
        .await?;

        let response = self
            .inner
            .clone()
            .oneshot(request)
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(Error::Transport)?
            .to_bytes();

        if status.is_success() {
            debug!(%method, url = %url, %status, "request succeeded");
            return serde_json::from_slice(&body).map_err(Error::from);
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        error!(%method, url = %url, %status, body = %text, "request failed");

        let error = ApiError::new(status, url, text, payload);
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Err(Error::Authentication(error))
        } else {
            Err(Error::Api(error))
        }
    }
}
