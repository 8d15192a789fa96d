//! Keystone v3 session
//!
//! One password authentication per session; the token and the public service
//! endpoints from the catalog are held for the session's lifetime. Changing
//! project scope means authenticating a fresh session, never mutating an
//! existing one. Token renewal on expiry is out of scope.

use crate::error::{OpenStackError, Result};
use cloudman_gateway::CloudCredentials;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Public endpoints discovered from the service catalog
#[derive(Debug, Clone)]
pub(crate) struct ServiceEndpoints {
    pub compute: String,
    pub network: String,
    pub image: String,
    /// Taken from the auth URL rather than the catalog; OS_AUTH_URL is
    /// already the versioned identity endpoint
    pub identity: String,
}

impl ServiceEndpoints {
    fn from_catalog(catalog: &[CatalogEntry], auth_url: &str) -> Result<Self> {
        Ok(Self {
            compute: public_url(catalog, "compute")?,
            network: public_url(catalog, "network")?,
            image: public_url(catalog, "image")?,
            identity: auth_url.trim_end_matches('/').to_string(),
        })
    }
}

fn public_url(catalog: &[CatalogEntry], service_type: &'static str) -> Result<String> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| endpoint.interface == "public")
        .map(|endpoint| endpoint.url.trim_end_matches('/').to_string())
        .ok_or(OpenStackError::MissingEndpoint(service_type))
}

/// An authenticated, project-scoped session
pub(crate) struct Session {
    http: reqwest::Client,
    token: String,
    endpoints: ServiceEndpoints,
}

impl Session {
    /// Authenticate with the password method, scoped to the credentials'
    /// project.
    pub async fn authenticate(credentials: &CloudCredentials) -> Result<Self> {
        let http = build_client(credentials).await?;
        let url = format!(
            "{}/auth/tokens",
            credentials.auth_url.trim_end_matches('/')
        );

        tracing::debug!(%url, project = %credentials.project_name, "authenticating");
        let response = http.post(&url).json(&auth_request(credentials)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenStackError::AuthenticationFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(OpenStackError::TokenMissing)?;

        let auth: AuthResponse = response.json().await?;
        let endpoints =
            ServiceEndpoints::from_catalog(&auth.token.catalog, &credentials.auth_url)?;

        Ok(Self {
            http,
            token,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        parse(response).await
    }

    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        parse(response).await
    }

    pub async fn put_json<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%url, "PUT");
        let response = self
            .http
            .put(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        parse(response).await
    }

    pub async fn delete(&self, url: &str) -> Result<()> {
        tracing::debug!(%url, "DELETE");
        let response = self
            .http
            .delete(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenStackError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OpenStackError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

async fn build_client(credentials: &CloudCredentials) -> Result<reqwest::Client> {
    match &credentials.cacert {
        Some(path) => {
            let pem = tokio::fs::read(path).await.map_err(|source| {
                OpenStackError::CaCert {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)?;
            Ok(reqwest::Client::builder()
                .add_root_certificate(cert)
                .build()?)
        }
        None => Ok(reqwest::Client::new()),
    }
}

fn auth_request(credentials: &CloudCredentials) -> serde_json::Value {
    json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": credentials.username,
                        "domain": { "name": credentials.user_domain_name },
                        "password": credentials.password,
                    }
                }
            },
            "scope": {
                "project": {
                    "name": credentials.project_name,
                    "domain": { "name": credentials.project_domain_name },
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: TokenWire,
}

#[derive(Debug, Deserialize)]
struct TokenWire {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct CatalogEndpoint {
    interface: String,
    url: String,
}
