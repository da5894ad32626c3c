use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskicle_config::ClientConfig;
use taskicle_core::{ApiFailurePayload, TransportFailure};
use url::Url;

use crate::error::{ClientError, Result};
use crate::frame::{ContentFrame, SaveFrame};
use crate::interceptor::{PassThrough, RequestInterceptor, ResponseInterceptor, SessionCookie};
use crate::types::{
    Envelope, LoginInfo, NewTask, Page, PageCreated, PageGroup, PageRequest, PageVersion, Project, Task, TaskComment,
    TaskUpdate, UserRole,
};

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed client for the Taskicle backend
///
/// Sends JSON with a fixed timeout and no retries. Transport failures are
/// returned unchanged as [`ClientError::Transport`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: Option<SessionCookie>,
    request_interceptor: Arc<dyn RequestInterceptor>,
    response_interceptor: Arc<dyn ResponseInterceptor>,
}

impl ApiClient {
    /// Create a new client pointing at the given base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            http,
            session: None,
            request_interceptor: Arc::new(PassThrough),
            response_interceptor: Arc::new(PassThrough),
        })
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(config.base_url.as_str())?;
        if let Some(ref sid) = config.session_id {
            client.set_session(sid.clone());
        }
        Ok(client)
    }

    /// Replace the hook run on outgoing requests
    #[must_use]
    pub fn with_request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request_interceptor = Arc::new(interceptor);
        self
    }

    /// Replace the hook run on responses and failures
    #[must_use]
    pub fn with_response_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.response_interceptor = Arc::new(interceptor);
        self
    }

    /// Get the base URL
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Point the client at a different backend
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid; the previous base URL is kept
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        self.base_url = parse_base_url(base_url)?;
        tracing::info!(base_url = %self.base_url, "API base URL changed");
        Ok(())
    }

    /// Use an existing session id for subsequent requests
    pub fn set_session(&mut self, session_id: SecretString) {
        self.session = Some(SessionCookie::new(session_id));
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Current session id, if logged in
    pub fn session_id(&self) -> Option<&SecretString> {
        self.session.as_ref().map(SessionCookie::session_id)
    }

    // -- Generic calls --

    /// Send a GET request and decode the envelope's `data`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend reports a
    /// failure, or the data does not match `T`
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self.http.get(make_url(&self.base_url, path)).query(query);
        self.send(builder).await
    }

    /// Send a POST request with a JSON body and decode the envelope's `data`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend reports a
    /// failure, or the data does not match `T`
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.post(make_url(&self.base_url, path)).json(body);
        self.send(builder).await
    }

    // -- Session --

    /// Log in and keep the issued session for later requests
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with code 13 on a wrong password, or any
    /// transport failure
    pub async fn login(&mut self, user_name: &str, password: &SecretString) -> Result<LoginInfo> {
        let query = [
            ("user_name", user_name.to_owned()),
            ("password", password.expose_secret().to_owned()),
        ];
        let builder = self.http.get(make_url(&self.base_url, "/api/login")).query(&query);

        let result = async {
            let response = self.try_execute(builder).await?;
            let session = response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .find_map(SessionCookie::from_set_cookie);
            let info: LoginInfo = decode(response).await?;
            Ok::<_, ClientError>((info, session))
        }
        .await;
        let (info, session) = self.intercept_error(result)?;

        match session {
            Some(session) => self.session = Some(session),
            None => tracing::warn!("login succeeded without a session cookie"),
        }
        tracing::info!(user = user_name, role = ?info.role, "logged in");

        Ok(info)
    }

    /// Create a user account
    ///
    /// `key` is the registration key handed out by the server operator.
    pub async fn register(
        &self,
        name: &str,
        password: &SecretString,
        key: &SecretString,
        role: UserRole,
    ) -> Result<()> {
        let body = serde_json::json!({
            "name": name,
            "password": password.expose_secret(),
            "key": key.expose_secret(),
            "role": i64::from(role),
        });
        self.post("/api/register", &body).await
    }

    // -- Projects --

    /// List projects visible to the current user
    pub async fn list_projects(&self, page: PageRequest) -> Result<Vec<Project>> {
        let projects: Option<Vec<Project>> = self.get("/api/proj_list", &page.query()).await?;
        Ok(projects.unwrap_or_default())
    }

    pub async fn create_project(&self, project_name: &str) -> Result<()> {
        self.post("/api/proj_insert", &serde_json::json!({ "project_name": project_name }))
            .await
    }

    pub async fn rename_project(&self, project_id: i64, project_name: &str) -> Result<()> {
        let body = serde_json::json!({ "project_id": project_id, "project_name": project_name });
        self.post("/api/proj_update", &body).await
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<()> {
        self.post("/api/proj_delete", &serde_json::json!({ "project_id": project_id }))
            .await
    }

    // -- Tasks --

    /// List tasks of a project
    pub async fn list_tasks(&self, project_id: i64, page: PageRequest) -> Result<Vec<Task>> {
        let [count, page] = page.query();
        let query = [("project_id", project_id.to_string()), count, page];

        let tasks: Option<Vec<Task>> = self.get("/api/task_list", &query).await?;
        Ok(tasks.unwrap_or_default())
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<()> {
        self.post("/api/task_insert", task).await
    }

    pub async fn update_task(&self, update: &TaskUpdate) -> Result<()> {
        if update.is_empty() {
            tracing::debug!(task_id = update.task_id, "sending task update without fields");
        }
        self.post("/api/task_update", update).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        self.post("/api/task_delete", &serde_json::json!({ "task_id": task_id }))
            .await
    }

    // -- Task comments --

    /// List comments of a task, oldest first
    pub async fn list_task_comments(&self, task_id: i64, page: PageRequest) -> Result<Vec<TaskComment>> {
        let [count, page] = page.query();
        let query = [("task_id", task_id.to_string()), count, page];

        let comments: Option<Vec<TaskComment>> = self.get("/api/task_comm_list", &query).await?;
        Ok(comments.unwrap_or_default())
    }

    pub async fn add_task_comment(&self, task_id: i64, content: &str) -> Result<()> {
        let body = serde_json::json!({ "task_id": task_id, "content": content });
        self.post("/api/task_comm_insert", &body).await
    }

    pub async fn update_task_comment(&self, comm_id: i64, content: &str) -> Result<()> {
        let body = serde_json::json!({ "comm_id": comm_id, "content": content });
        self.post("/api/task_comm_update", &body).await
    }

    pub async fn delete_task_comment(&self, comm_id: i64) -> Result<()> {
        self.post("/api/task_comm_delete", &serde_json::json!({ "comm_id": comm_id }))
            .await
    }

    // -- Page groups --

    /// List article groups visible to the current user
    pub async fn list_page_groups(&self, page: PageRequest) -> Result<Vec<PageGroup>> {
        let groups: Option<Vec<PageGroup>> = self.get("/api/page_group_list", &page.query()).await?;
        Ok(groups.unwrap_or_default())
    }

    pub async fn create_page_group(&self, group_name: &str) -> Result<()> {
        self.post("/api/page_group_insert", &serde_json::json!({ "group_name": group_name }))
            .await
    }

    pub async fn rename_page_group(&self, page_group_id: i64, group_name: &str) -> Result<()> {
        let body = serde_json::json!({ "page_group_id": page_group_id, "group_name": group_name });
        self.post("/api/page_group_update", &body).await
    }

    pub async fn delete_page_group(&self, page_group_id: i64) -> Result<()> {
        let body = serde_json::json!({ "page_group_id": page_group_id });
        self.post("/api/page_group_delete", &body).await
    }

    // -- Pages --

    /// List pages of a group
    pub async fn list_pages(&self, page_group_id: i64, page: PageRequest) -> Result<Vec<Page>> {
        let [count, page] = page.query();
        let query = [("group_id", page_group_id.to_string()), count, page];

        let pages: Option<Vec<Page>> = self.get("/api/page_list", &query).await?;
        Ok(pages.unwrap_or_default())
    }

    /// Create an empty page and return its id
    pub async fn create_page(&self, page_group_id: i64, page_name: &str) -> Result<i64> {
        let body = serde_json::json!({ "page_group_id": page_group_id, "page_name": page_name });
        let created: PageCreated = self.post("/api/page_insert", &body).await?;
        Ok(created.page_id)
    }

    pub async fn rename_page(&self, page_id: i64, page_name: &str) -> Result<()> {
        let body = serde_json::json!({ "page_id": page_id, "page_name": page_name });
        self.post("/api/page_update", &body).await
    }

    pub async fn delete_page(&self, page_id: i64) -> Result<()> {
        self.post("/api/page_delete", &serde_json::json!({ "page_id": page_id }))
            .await
    }

    /// Load the latest version of a page, or its draft
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with code 10 when a draft is requested
    /// but none exists
    pub async fn load_page(&self, page_id: i64, draft: bool) -> Result<String> {
        let query = [
            ("page_id", page_id.to_string()),
            ("is_draft", u8::from(draft).to_string()),
        ];
        let builder = self.http.get(make_url(&self.base_url, "/api/page_load")).query(&query);
        self.send_frame(builder).await
    }

    /// Save page content as a new version, or as the draft
    pub async fn save_page(&self, page_id: i64, content: &str, draft: bool) -> Result<()> {
        let page_id = i32::try_from(page_id)
            .map_err(|_| ClientError::Config(format!("page id {page_id} does not fit a page frame")))?;
        let frame = SaveFrame::new(page_id, draft, Bytes::copy_from_slice(content.as_bytes())).encode()?;

        let builder = self
            .http
            .post(make_url(&self.base_url, "/api/page_save"))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(frame);
        self.send(builder).await
    }

    /// List saved versions of a page, newest first
    pub async fn list_page_versions(&self, page_id: i64, page: PageRequest) -> Result<Vec<PageVersion>> {
        let [count, page] = page.query();
        let query = [("page_id", page_id.to_string()), count, page];

        let versions: Option<Vec<PageVersion>> = self.get("/api/page_version_list", &query).await?;
        Ok(versions.unwrap_or_default())
    }

    /// Load the content of one saved version
    pub async fn load_page_version(&self, page_id: i64, ver_id: i64) -> Result<String> {
        let query = [("page_id", page_id.to_string()), ("ver_id", ver_id.to_string())];
        let builder = self
            .http
            .get(make_url(&self.base_url, "/api/page_version_content"))
            .query(&query);
        self.send_frame(builder).await
    }

    // -- Plumbing --

    /// Send the request and unwrap the envelope
    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let result = match self.try_execute(builder).await {
            Ok(response) => decode(response).await,
            Err(e) => Err(e),
        };
        self.intercept_error(result)
    }

    /// Send the request and unwrap a binary content frame
    async fn send_frame(&self, builder: reqwest::RequestBuilder) -> Result<String> {
        let result = match self.try_execute(builder).await {
            Ok(response) => decode_frame(response).await,
            Err(e) => Err(e),
        };
        self.intercept_error(result)
    }

    /// Give the response interceptor a chance to rewrite a failure
    fn intercept_error<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|e| self.response_interceptor.on_error(e))
    }

    /// Run the request interceptors and send the request
    async fn try_execute(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut request = builder.build()?;
        if let Some(ref session) = self.session {
            request = session.on_request(request)?;
        }
        let request = self.request_interceptor.on_request(request)?;

        let method = request.method().clone();
        let path = request.url().path().to_owned();
        tracing::debug!(%method, %path, "sending request");

        let response = self.http.execute(request).await.inspect_err(|e| {
            tracing::debug!(%method, %path, error = %e, "request failed");
        })?;
        let response = self.response_interceptor.on_response(response)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%method, %path, %status, "non-success status");
            return Err(TransportFailure::from_status(status).into());
        }

        Ok(response)
    }
}

// -- Helper functions --

/// Parse and check a base URL
fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| ClientError::Config(format!("invalid base URL: {e}")))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!("base URL must be http(s): {base_url}")));
    }

    Ok(url)
}

/// Append a request path to the base URL's own path
fn make_url(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    let joined = format!(
        "{}/{}",
        base_url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url
}

/// Unwrap the response envelope
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await?;
    let envelope: Envelope = serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))?;

    if !envelope.r.is_success() {
        let payload = ApiFailurePayload {
            r: envelope.r,
            r2: envelope.r2,
            err_msg: envelope.err_msg,
        };
        tracing::debug!(code = %payload.r, r2 = payload.r2, "backend reported failure");
        return Err(ClientError::Api(payload));
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| ClientError::Parse(format!("unexpected data: {e}")))
}

/// Unwrap a binary content frame
async fn decode_frame(response: reqwest::Response) -> Result<String> {
    let body = response.bytes().await?;
    let frame = ContentFrame::decode(&body)?;

    if !frame.r.is_success() {
        tracing::debug!(code = %frame.r, r2 = frame.r2, "backend reported failure");
        return Err(ClientError::Api(ApiFailurePayload::new(frame.r, i64::from(frame.r2))));
    }

    String::from_utf8(frame.content.to_vec()).map_err(|e| ClientError::Parse(format!("page content: {e}")))
}
