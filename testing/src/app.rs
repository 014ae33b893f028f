//! Temporary database and in-process application.

use axum::{Router, body::Body};
use http::{HeaderMap, Method, Request, StatusCode, header};
use posgrado_core::AppError;
use posgrado_database::{Database, DatabaseTarget, schema};
use posgrado_server::{AppState, EnvMap, Settings, create};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn fixture_error<E>(what: &str, source: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::internal(format!("Test fixture failed: {what}")).with_source(source)
}

/// A `SQLite` file in a temporary directory, schema installed.
///
/// The directory is removed when the value is dropped.
#[derive(Debug)]
pub struct TestDatabase {
    dir: TempDir,
    /// Pool over the file.
    pub db: Database,
}

impl TestDatabase {
    /// Create the file and install the schema.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the directory cannot be created, or the
    /// classified database error of the schema installation.
    pub async fn new() -> Result<Self, AppError> {
        let dir = tempfile::tempdir().map_err(|e| fixture_error("temp dir", e))?;
        let target = DatabaseTarget::LocalFile {
            path: Self::file_in(&dir),
        };
        let db = Database::connect_lazy(&target, &posgrado_database::PoolOptions::default())?;
        schema::install(&db).await?;
        Ok(Self { dir, db })
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> String {
        Self::file_in(&self.dir)
    }

    fn file_in(dir: &TempDir) -> String {
        dir.path().join("posgrado_test.db").to_string_lossy().into_owned()
    }
}

/// Response captured by [`TestApp`].
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON, `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Value of a header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The assembled application over a fresh [`TestDatabase`].
#[derive(Debug)]
pub struct TestApp {
    /// Router built by the application factory.
    pub router: Router,
    /// Settings the router was built with.
    pub settings: Arc<Settings>,
    /// Backing database.
    pub database: TestDatabase,
}

impl TestApp {
    /// Application with default settings.
    ///
    /// # Errors
    ///
    /// Propagates database, settings and factory errors.
    pub async fn new() -> Result<Self, AppError> {
        Self::with_env(EnvMap::new()).await
    }

    /// Application with extra environment values (`CORS_ORIGINS`, prefixes, ...).
    ///
    /// # Errors
    ///
    /// Propagates database, settings and factory errors.
    pub async fn with_env(mut env: EnvMap) -> Result<Self, AppError> {
        let database = TestDatabase::new().await?;
        env.insert("LOCAL_DATABASE_PATH".to_string(), database.path());

        let settings = Arc::new(Settings::resolve(&crate::local_secrets(), &env).await?);
        let router = create(AppState::new(Arc::clone(&settings), database.db.clone()))?;

        Ok(Self {
            router,
            settings,
            database,
        })
    }

    /// Send a request built by the caller.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse, AppError> {
        let Ok(response) = self.router.clone().oneshot(request).await;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| fixture_error("read body", e))?
            .to_vec();

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    /// `method uri` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns an internal error for an invalid URI or unreadable body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<TestResponse, AppError> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| fixture_error("build request", e))?;

        self.send(request).await
    }

    /// `GET uri`.
    ///
    /// # Errors
    ///
    /// See [`TestApp::request`].
    pub async fn get(&self, uri: &str) -> Result<TestResponse, AppError> {
        self.request(Method::GET, uri, None).await
    }

    /// `POST uri` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestApp::request`].
    pub async fn post(&self, uri: &str, body: &Value) -> Result<TestResponse, AppError> {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// `PATCH uri` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestApp::request`].
    pub async fn patch(&self, uri: &str, body: &Value) -> Result<TestResponse, AppError> {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    /// `{GLOBAL_PREFIX}{path}`.
    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}{path}", self.settings.global_prefix)
    }
}
