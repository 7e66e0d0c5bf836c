use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

/// How the SDK authenticates against the server
#[derive(Debug, Clone)]
pub enum Credentials {
    None,
    /// Admin session token, sent as bearer token
    AdminSession(String),
    /// Shared secret of the cron caller
    CronSecret(String),
}

#[derive(Debug, Clone)]
pub enum APIErrorVariant {
    Network,
    MalformedResponse,
    UnexpectedStatusCode(StatusCode),
}

#[derive(Debug, Clone)]
pub struct APIError {
    pub variant: APIErrorVariant,
    pub message: String,
}

impl APIError {
    /// The status code returned by the server, if it answered
    pub fn status(&self) -> Option<StatusCode> {
        match self.variant {
            APIErrorVariant::UnexpectedStatusCode(status) => Some(status),
            _ => None,
        }
    }
}

pub type APIResponse<T> = Result<T, APIError>;

pub(crate) struct BaseClient {
    client: Client,
    address: String,
    credentials: Credentials,
}

impl BaseClient {
    pub fn new(address: String, credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            address,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.address, path)
    }

    fn authenticate(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::None => req,
            Credentials::AdminSession(token) => req.bearer_auth(token),
            Credentials::CronSecret(secret) => req.header("x-cron-secret", secret),
        }
    }

    async fn handle_api_response<T: DeserializeOwned>(
        &self,
        res: Result<Response, reqwest::Error>,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = res.map_err(|e| APIError {
            variant: APIErrorVariant::Network,
            message: e.to_string(),
        })?;

        let status = res.status();
        if status != expected_status_code {
            return Err(APIError {
                variant: APIErrorVariant::UnexpectedStatusCode(status),
                message: res.text().await.unwrap_or_default(),
            });
        }

        res.json::<T>().await.map_err(|e| APIError {
            variant: APIErrorVariant::MalformedResponse,
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.authenticate(self.client.get(self.url(&path)));
        self.handle_api_response(req.send().await, expected_status_code)
            .await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: String,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.authenticate(self.client.get(self.url(&path)).query(query));
        self.handle_api_response(req.send().await, expected_status_code)
            .await
    }

    pub async fn post<T: DeserializeOwned, S: Serialize>(
        &self,
        body: Option<S>,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let mut req = self.authenticate(self.client.post(self.url(&path)));
        if let Some(body) = body {
            req = req.json(&body);
        }
        self.handle_api_response(req.send().await, expected_status_code)
            .await
    }

    pub async fn put<T: DeserializeOwned, S: Serialize>(
        &self,
        body: S,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.authenticate(self.client.put(self.url(&path)).json(&body));
        self.handle_api_response(req.send().await, expected_status_code)
            .await
    }
}
