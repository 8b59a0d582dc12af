use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use types::{Identity, LikeRecord, MovieId, NewPost, Post, PostId, UserId};
use url::Url;

use crate::{DataService, Error, PostOrder, Result};

const POSTS_PATH: &str = "rest/v1/posts";
const LIKES_PATH: &str = "rest/v1/likes";
const INCREMENT_VIEWS_PATH: &str = "rest/v1/rpc/increment_views";
const USER_PATH: &str = "auth/v1/user";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error body shapes of the rest and auth endpoints
#[derive(Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

#[derive(Serialize)]
struct IncrementViewsArgs {
    post_id: PostId,
}

/// Talks to the hosted backend over its REST and auth endpoints
#[derive(Clone)]
pub struct RestDataService {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestDataService {
    pub fn new(mut base_url: Url, anon_key: impl Into<String>) -> Self {
        // joins replace the last segment otherwise
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
    }

    fn likes_url(&self, user: &UserId, movie_id: &MovieId) -> Result<Url> {
        let mut url = self.endpoint(LIKES_PATH)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user}"))
            .append_pair("movie_id", &format!("eq.{movie_id}"));
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        error_for_status(resp).await
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.send(req).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn error_for_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServiceErrorBody>(&body)
        .ok()
        .and_then(|body| body.message.or(body.msg).or(body.error_description))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(Error::Service {
        status: status.as_u16(),
        message,
    })
}

impl DataService for RestDataService {
    async fn list_posts(&self, order: PostOrder, limit: Option<usize>) -> Result<Vec<Post>> {
        let mut url = self.endpoint(POSTS_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("select", "*")
                .append_pair("order", &format!("{}.desc", order.column()));
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }

        self.send_json(self.request(Method::GET, url)).await
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let url = self.endpoint(POSTS_PATH)?;
        let req = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(&post);

        self.send_json(req).await
    }

    async fn increment_views(&self, post_id: PostId) -> Result<()> {
        let url = self.endpoint(INCREMENT_VIEWS_PATH)?;
        let req = self
            .request(Method::POST, url)
            .json(&IncrementViewsArgs { post_id });

        self.send(req).await?;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };

        let url = self.endpoint(USER_PATH)?;
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                log::debug!("access token rejected, treating session as anonymous");
                Ok(None)
            }
            _ => {
                let resp = error_for_status(resp).await?;
                let body = resp.text().await?;
                Ok(Some(serde_json::from_str(&body)?))
            }
        }
    }

    async fn is_movie_liked(&self, user: &UserId, movie_id: &MovieId) -> Result<bool> {
        let mut url = self.likes_url(user, movie_id)?;
        url.query_pairs_mut().append_pair("select", "movie_id");

        let rows: Vec<serde_json::Value> = self.send_json(self.request(Method::GET, url)).await?;
        Ok(!rows.is_empty())
    }

    async fn like_movie(&self, user: &UserId, movie_id: &MovieId) -> Result<()> {
        let url = self.endpoint(LIKES_PATH)?;
        let req = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&LikeRecord {
                user_id: user.clone(),
                movie_id: movie_id.clone(),
            });

        self.send(req).await?;
        Ok(())
    }

    async fn unlike_movie(&self, user: &UserId, movie_id: &MovieId) -> Result<()> {
        let url = self.likes_url(user, movie_id)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn post_json(id: i64, views: u64) -> serde_json::Value {
        json!({
            "id": id,
            "movie_name": format!("movie {id}"),
            "content": "review",
            "views": views,
            "created_at": "2024-10-01T12:34:56.123456+00:00"
        })
    }

    fn service(server: &MockServer) -> RestDataService {
        RestDataService::new(server.uri().parse().unwrap(), "anon")
    }

    #[tokio::test]
    async fn lists_posts_with_order_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .and(query_param("select", "*"))
            .and(query_param("order", "views.desc"))
            .and(query_param("limit", "10"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([post_json(2, 9), post_json(1, 3)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let posts = service(&server)
            .list_posts(PostOrder::ViewsDesc, Some(10))
            .await
            .unwrap();
        assert_eq!(
            posts.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![PostId(2), PostId(1)]
        );
    }

    #[tokio::test]
    async fn surfaces_service_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "42703",
                "message": "column posts.created_at does not exist"
            })))
            .mount(&server)
            .await;

        let err = service(&server)
            .list_posts(PostOrder::CreatedAtDesc, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Service { status: 400, .. }));
        assert_eq!(err.to_string(), "column posts.created_at does not exist");
    }

    #[tokio::test]
    async fn malformed_rows_fail_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let err = service(&server)
            .list_posts(PostOrder::CreatedAtDesc, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn increments_views_through_rpc() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/increment_views"))
            .and(body_json(json!({"post_id": 7})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        service(&server).increment_views(PostId(7)).await.unwrap();
    }

    #[tokio::test]
    async fn inserts_post_and_returns_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/posts"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"movie_name": "Heat", "content": "heist"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(post_json(11, 0)))
            .expect(1)
            .mount(&server)
            .await;

        let post = service(&server)
            .insert_post(NewPost::new("Heat", "heist").unwrap())
            .await
            .unwrap();
        assert_eq!(post.id, PostId(11));
    }

    #[tokio::test]
    async fn identity_absent_without_token_or_when_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer expired"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer good"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "u-1", "email": "a@b.c"})),
            )
            .mount(&server)
            .await;

        let anonymous = service(&server);
        assert_eq!(anonymous.current_identity().await.unwrap(), None);

        let expired = service(&server).with_access_token(Some("expired".into()));
        assert_eq!(expired.current_identity().await.unwrap(), None);

        let signed_in = service(&server).with_access_token(Some("good".into()));
        let identity = signed_in.current_identity().await.unwrap().unwrap();
        assert_eq!(identity.id, UserId("u-1".into()));
    }

    #[tokio::test]
    async fn like_relation_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/likes"))
            .and(query_param("user_id", "eq.u-1"))
            .and(query_param("movie_id", "eq.m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"movie_id": "m1"}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/likes"))
            .and(body_json(json!({"user_id": "u-1", "movie_id": "m1"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/likes"))
            .and(query_param("movie_id", "eq.m1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server).with_access_token(Some("good".into()));
        let user = UserId("u-1".into());
        let movie = MovieId::from("m1");
        assert!(svc.is_movie_liked(&user, &movie).await.unwrap());
        svc.like_movie(&user, &movie).await.unwrap();
        svc.unlike_movie(&user, &movie).await.unwrap();
    }
}
