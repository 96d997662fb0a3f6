use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::TracedClient;
use crate::contract::model::{Profile, UserId, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::ProfileRemote;

/// REST adapter implementing the ProfileRemote port against a json-server
/// style backend (`/users`, `/posts`).
pub struct HttpProfileRemote {
    client: TracedClient,
    base: Url,
}

impl HttpProfileRemote {
    pub fn new(client: TracedClient, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, operation: &str, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::transport(operation, "invalid API base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T, DomainError> {
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::transport(operation, format!("HTTP {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::transport(operation, format!("invalid response body: {e}")))
    }
}

fn decode_records(operation: &str, values: Vec<Value>) -> Result<Vec<UserRecord>, DomainError> {
    values
        .into_iter()
        .map(|v| {
            UserRecord::from_value(v)
                .map_err(|e| DomainError::transport(operation, format!("invalid user record: {e}")))
        })
        .collect()
}

#[async_trait]
impl ProfileRemote for HttpProfileRemote {
    #[instrument(
        name = "profile_sync.http.find_users_by_email",
        skip_all,
        fields(base = %self.base)
    )]
    async fn find_users_by_email(&self, email: &str) -> Result<Vec<UserRecord>, DomainError> {
        const OP: &str = "GET /users";
        let mut url = self.endpoint(OP, &["users"])?;
        url.query_pairs_mut().append_pair("email", email);

        let response = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| DomainError::transport(OP, e.to_string()))?;
        let values: Vec<Value> = Self::read_json(OP, response).await?;
        debug!(matches = values.len(), "User lookup finished");
        decode_records(OP, values)
    }

    #[instrument(
        name = "profile_sync.http.list_posts_by_author",
        skip_all,
        fields(base = %self.base, author = %author)
    )]
    async fn list_posts_by_author(&self, author: &UserId) -> Result<Vec<Value>, DomainError> {
        const OP: &str = "GET /posts";
        let mut url = self.endpoint(OP, &["posts"])?;
        url.query_pairs_mut()
            .append_pair("authorId", &author.to_string());

        let response = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| DomainError::transport(OP, e.to_string()))?;
        Self::read_json(OP, response).await
    }

    #[instrument(
        name = "profile_sync.http.put_user",
        skip_all,
        fields(base = %self.base, user_id = %id)
    )]
    async fn put_user(&self, id: &UserId, profile: &Profile) -> Result<UserRecord, DomainError> {
        const OP: &str = "PUT /users";
        let id_segment = id.to_string();
        let url = self.endpoint(OP, &["users", &id_segment])?;

        let response = self
            .client
            .put_json(url.as_str(), profile)
            .await
            .map_err(|e| DomainError::transport(OP, e.to_string()))?;
        let value: Value = Self::read_json(OP, response).await?;
        UserRecord::from_value(value)
            .map_err(|e| DomainError::transport(OP, format!("invalid user record: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(base: &str) -> HttpProfileRemote {
        HttpProfileRemote::new(TracedClient::default(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoints_join_onto_base_path() {
        let r = remote("http://api.local/v1/");
        let url = r.endpoint("op", &["users", "7"]).unwrap();
        assert_eq!(url.as_str(), "http://api.local/v1/users/7");

        let r = remote("http://api.local");
        let url = r.endpoint("op", &["posts"]).unwrap();
        assert_eq!(url.as_str(), "http://api.local/posts");
    }

    #[test]
    fn ids_are_path_escaped() {
        let r = remote("http://api.local/");
        let url = r.endpoint("op", &["users", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://api.local/users/a%2Fb%20c");
    }

    #[test]
    fn non_hierarchical_base_is_rejected() {
        let r = remote("mailto:someone@example.com");
        assert!(matches!(
            r.endpoint("GET /users", &["users"]),
            Err(DomainError::Transport { .. })
        ));
    }
}
