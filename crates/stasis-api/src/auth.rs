use secrecy::{ExposeSecret, SecretString};

/// HTTP Basic credentials for an ARI user (`ari.conf` user section).
///
/// Applied as an `Authorization` header on REST calls and as the
/// `api_key=user:password` query parameter on the event WebSocket.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The `user:password` pair ARI accepts as an `api_key` query parameter.
    pub(crate) fn api_key(&self) -> String {
        format!("{}:{}", self.username, self.password.expose_secret())
    }

    /// Attach HTTP Basic auth to a request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_joins_user_and_password() {
        let creds = Credentials::new("asterisk", "secret");
        assert_eq!(creds.api_key(), "asterisk:secret");
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("asterisk", "secret");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("\"secret\""), "password leaked: {rendered}");
    }
}
