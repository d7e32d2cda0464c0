//! HTTP client for the compute servers API.

use std::time::Duration;

use computest_id::{FlavorId, ImageId, ProjectId, ServerId, UserId};
use computest_model::flavor::FlavorEnvelope;
use computest_model::microversion::{API_VERSION_HEADER, LEGACY_VERSION_HEADER};
use computest_model::server::{ServerEnvelope, ServersEnvelope};
use computest_model::{
    fault, CreateServerBody, CreatedServer, Flavor, ListServersQuery, Microversion, ResetState,
    Server, ServerAction, ServerSummary, UpdateServerBody, UpdateServerRequest,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::{schemas, ClientError, Operation};

/// Header carrying the keystone token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Request id headers, checked in order when logging.
const REQUEST_ID_HEADERS: [&str; 2] = ["x-openstack-request-id", "x-compute-request-id"];

/// A pre-issued token and the project it is scoped to.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub project_id: ProjectId,
    pub user_id: Option<UserId>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            token: token.into(),
            project_id,
            user_id: None,
        }
    }
}

/// Which policy role the credentials carry. Admins see the
/// `OS-EXT-SRV-ATTR:*` attributes, so their show/list schemas are stricter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Tenant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Tenant => f.write_str("tenant"),
        }
    }
}

/// Servers API client bound to one set of credentials.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ServersClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    role: Role,
    microversion: Option<Microversion>,
    validate_schemas: bool,
}

impl ServersClient {
    /// Create a client for the compute endpoint (e.g. `http://host:8774/v2.1`).
    pub fn new(endpoint: &str, credentials: Credentials, role: Role) -> Result<Self, ClientError> {
        if endpoint.trim().is_empty() {
            return Err(ClientError::Config("compute endpoint is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&credentials.token)
            .map_err(|_| ClientError::Config("token is not a valid header value".to_string()))?;
        token.set_sensitive(true);
        headers.insert(AUTH_TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            credentials,
            role,
            microversion: None,
            validate_schemas: true,
        })
    }

    /// A copy of this client that requests `microversion` (`None` sends no
    /// version header, so the service answers at 2.1).
    pub fn with_microversion(&self, microversion: Option<Microversion>) -> Self {
        Self {
            microversion,
            ..self.clone()
        }
    }

    pub fn with_schema_validation(mut self, enabled: bool) -> Self {
        self.validate_schemas = enabled;
        self
    }

    /// Project the credentials are scoped to.
    pub fn tenant_id(&self) -> &ProjectId {
        &self.credentials.project_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn microversion(&self) -> Option<Microversion> {
        self.microversion
    }

    /// The version the service answers at for this client's requests.
    pub fn effective_microversion(&self) -> Microversion {
        self.microversion.unwrap_or(Microversion::V2_1)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.http.request(method, self.url(path));
        if let Some(version) = self.microversion {
            request = request
                .header(API_VERSION_HEADER, version.header_value())
                .header(LEGACY_VERSION_HEADER, version.to_string());
        }
        request
    }

    /// Send a request and return the body, failing unless the status is the
    /// operation's expected success code.
    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let request_id = REQUEST_ID_HEADERS
            .iter()
            .find_map(|name| response.headers().get(*name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(
            operation = %operation,
            role = %self.role,
            status,
            request_id = request_id.as_deref().unwrap_or("-"),
            "compute API call"
        );

        if status == operation.expected_status() {
            return Ok(body);
        }

        if (200..300).contains(&status) {
            return Err(ClientError::UnexpectedStatus {
                operation: operation.name(),
                status,
                expected: operation.expected_status(),
                body,
            });
        }

        let message = fault::parse_fault(&body)
            .map(|f| f.message)
            .unwrap_or(body);
        Err(ClientError::from_status(status, message))
    }

    /// Parse, validate against the response schema, and decode.
    fn decode<T: DeserializeOwned>(&self, operation: Operation, body: &str) -> Result<T, ClientError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|source| {
            ClientError::Decode {
                operation: operation.name(),
                source,
            }
        })?;

        if self.validate_schemas {
            schemas::validate(operation, self.effective_microversion(), self.role, &value)?;
        }

        serde_json::from_value(value).map_err(|source| ClientError::Decode {
            operation: operation.name(),
            source,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(operation, request).await?;
        self.decode(operation, &body)
    }

    async fn action<B: Serialize>(
        &self,
        operation: Operation,
        server_id: &ServerId,
        body: &B,
    ) -> Result<String, ClientError> {
        let request = self
            .request(Method::POST, &format!("/servers/{server_id}/action"))
            .json(body);
        self.send(operation, request).await
    }

    /// `POST /servers`
    pub async fn create_server(&self, body: &CreateServerBody) -> Result<CreatedServer, ClientError> {
        let request = self.request(Method::POST, "/servers").json(body);
        let envelope: ServerEnvelope<CreatedServer> =
            self.call(Operation::CreateServer, request).await?;
        debug!(server_id = %envelope.server.id, name = %body.server.name, "server create accepted");
        Ok(envelope.server)
    }

    /// `GET /servers/{id}`
    pub async fn show_server(&self, server_id: &ServerId) -> Result<Server, ClientError> {
        let request = self.request(Method::GET, &format!("/servers/{server_id}"));
        let envelope: ServerEnvelope<Server> = self.call(Operation::ShowServer, request).await?;
        Ok(envelope.server)
    }

    /// `GET /servers?<filters>`
    pub async fn list_servers(
        &self,
        query: &ListServersQuery,
    ) -> Result<Vec<ServerSummary>, ClientError> {
        let request = self.request(Method::GET, "/servers").query(query);
        let envelope: ServersEnvelope<ServerSummary> =
            self.call(Operation::ListServers, request).await?;
        Ok(envelope.servers)
    }

    /// `GET /servers/detail?<filters>`
    pub async fn list_servers_detail(
        &self,
        query: &ListServersQuery,
    ) -> Result<Vec<Server>, ClientError> {
        let request = self.request(Method::GET, "/servers/detail").query(query);
        let envelope: ServersEnvelope<Server> =
            self.call(Operation::ListServersDetail, request).await?;
        Ok(envelope.servers)
    }

    /// `PUT /servers/{id}`
    pub async fn update_server(
        &self,
        server_id: &ServerId,
        update: &UpdateServerRequest,
    ) -> Result<Server, ClientError> {
        let body = UpdateServerBody {
            server: update.clone(),
        };
        let request = self
            .request(Method::PUT, &format!("/servers/{server_id}"))
            .json(&body);
        let envelope: ServerEnvelope<Server> = self.call(Operation::UpdateServer, request).await?;
        Ok(envelope.server)
    }

    /// `DELETE /servers/{id}`
    pub async fn delete_server(&self, server_id: &ServerId) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/servers/{server_id}"));
        self.send(Operation::DeleteServer, request).await?;
        Ok(())
    }

    /// `os-resetState` action. Admin only.
    pub async fn reset_state(&self, server_id: &ServerId, state: ResetState) -> Result<(), ClientError> {
        debug!(server_id = %server_id, state = %state, "resetting server state");
        self.action(Operation::ResetState, server_id, &ServerAction::reset_state(state))
            .await?;
        Ok(())
    }

    /// `rebuild` action.
    pub async fn rebuild_server(
        &self,
        server_id: &ServerId,
        image_ref: &ImageId,
    ) -> Result<Server, ClientError> {
        debug!(server_id = %server_id, image_ref = %image_ref, "rebuilding server");
        let body = self
            .action(
                Operation::RebuildServer,
                server_id,
                &ServerAction::rebuild(image_ref.clone()),
            )
            .await?;
        let envelope: ServerEnvelope<Server> = self.decode(Operation::RebuildServer, &body)?;
        Ok(envelope.server)
    }

    /// `injectNetworkInfo` action. Admin only.
    pub async fn inject_network_info(&self, server_id: &ServerId) -> Result<(), ClientError> {
        self.action(
            Operation::InjectNetworkInfo,
            server_id,
            &ServerAction::inject_network_info(),
        )
        .await?;
        Ok(())
    }

    /// `GET /flavors/{id}`
    pub async fn show_flavor(&self, flavor_id: &FlavorId) -> Result<Flavor, ClientError> {
        let request = self.request(Method::GET, &format!("/flavors/{flavor_id}"));
        let envelope: FlavorEnvelope = self.call(Operation::ShowFlavor, request).await?;
        Ok(envelope.flavor)
    }
}
