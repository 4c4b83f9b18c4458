use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    dto::{
        answer::{AnswerRequest, AnswerResponse},
        login::{LoginRequest, LoginResponse},
        movie::PreviousMovieResponse,
        phase::PhaseResponse,
        players::PlayerResponse,
    },
    remote::{RemoteGameService, RemoteResult},
};

use super::{
    config::HttpRemoteConfig,
    error::{HttpRemoteError, HttpResult},
};

const PHASE_PATH: &str = "game/phase";
const PLAYERS_PATH: &str = "game/players";
const PREVIOUS_MOVIE_PATH: &str = "game/previous-movie";
const ANSWER_PATH: &str = "game/answer";
const CURRENT_MOVIE_PATH: &str = "game/current-movie";
const LOGIN_PATH: &str = "login";

/// [`RemoteGameService`] backed by the game's JSON HTTP API.
///
/// The client keeps a cookie store so the session cookie handed out by `/login` is replayed on
/// every later call.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: Arc<str>,
}

impl HttpRemote {
    /// Build a client for the configured service.
    pub fn new(config: HttpRemoteConfig) -> HttpResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| HttpRemoteError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));

        Ok(Self { client, base_url })
    }

    /// URL of the media stream for the movie currently being played.
    pub fn current_movie_url(&self) -> String {
        self.url(CURRENT_MOVIE_PATH)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T, B>(&self, method: Method, path: &'static str, body: Option<&B>) -> HttpResult<T>
    where
        T: DeserializeOwned,
        B: ?Sized + Serialize,
    {
        let mut builder = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| HttpRemoteError::RequestSend { path, source })?;

        let status = response.status();
        debug!(%method, path, %status, "game service responded");
        if !status.is_success() {
            return Err(HttpRemoteError::RequestStatus { path, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| HttpRemoteError::ReadBody { path, source })?;

        serde_json::from_slice(&bytes).map_err(|source| HttpRemoteError::DecodeResponse { path, source })
    }

    async fn get_json<T>(&self, path: &'static str) -> HttpResult<T>
    where
        T: DeserializeOwned,
    {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    async fn post_json<T, B>(&self, path: &'static str, body: &B) -> HttpResult<T>
    where
        T: DeserializeOwned,
        B: ?Sized + Serialize,
    {
        self.send(Method::POST, path, Some(body)).await
    }
}

impl RemoteGameService for HttpRemote {
    fn fetch_phase(&self) -> BoxFuture<'static, RemoteResult<PhaseResponse>> {
        let remote = self.clone();
        Box::pin(async move { remote.get_json::<PhaseResponse>(PHASE_PATH).await.map_err(Into::into) })
    }

    fn fetch_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerResponse>>> {
        let remote = self.clone();
        Box::pin(async move { remote.get_json::<Vec<PlayerResponse>>(PLAYERS_PATH).await.map_err(Into::into) })
    }

    fn fetch_previous_movie(&self) -> BoxFuture<'static, RemoteResult<PreviousMovieResponse>> {
        let remote = self.clone();
        Box::pin(async move {
            remote
                .get_json::<PreviousMovieResponse>(PREVIOUS_MOVIE_PATH)
                .await
                .map_err(Into::into)
        })
    }

    fn submit_answer(
        &self,
        request: AnswerRequest,
    ) -> BoxFuture<'static, RemoteResult<AnswerResponse>> {
        let remote = self.clone();
        Box::pin(async move {
            remote
                .post_json::<AnswerResponse, _>(ANSWER_PATH, &request)
                .await
                .map_err(Into::into)
        })
    }

    fn login(&self, request: LoginRequest) -> BoxFuture<'static, RemoteResult<LoginResponse>> {
        let remote = self.clone();
        Box::pin(async move {
            remote
                .post_json::<LoginResponse, _>(LOGIN_PATH, &request)
                .await
                .map_err(Into::into)
        })
    }
}
