// src/config.rs

use std::{env, net::SocketAddr, str::FromStr};

use dotenvy::dotenv;
use url::Url;

use crate::quiz::SubmissionDurability;

/// How bearer tokens are verified.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Local HS256 verification with the provider's shared secret.
    Jwt {
        secret: String,
        audience: Option<String>,
    },
    /// Ask the provider's user endpoint on every request.
    Remote { base_url: Url, api_key: String },
}

/// Who may soft-delete a quiz.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Any authenticated user.
    #[default]
    Any,
    /// Only the quiz's creator.
    Owner,
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown quiz delete policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub quiz_delete_policy: DeletePolicy,
    pub seed_sample_quiz: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("BIND_ADDR must be a socket address like 0.0.0.0:3000");

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let auth = match env::var("AUTH_PROVIDER")
            .unwrap_or_else(|_| "jwt".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "remote" => AuthConfig::Remote {
                base_url: env::var("AUTH_PROVIDER_URL")
                    .expect("AUTH_PROVIDER_URL must be set when AUTH_PROVIDER=remote")
                    .parse()
                    .expect("AUTH_PROVIDER_URL must be a valid URL"),
                api_key: env::var("AUTH_PROVIDER_API_KEY")
                    .expect("AUTH_PROVIDER_API_KEY must be set when AUTH_PROVIDER=remote"),
            },
            "jwt" => AuthConfig::Jwt {
                secret: env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set"),
                audience: match env::var("AUTH_JWT_AUDIENCE") {
                    Ok(aud) if aud.is_empty() => None,
                    Ok(aud) => Some(aud),
                    Err(_) => Some("authenticated".to_string()),
                },
            },
            other => panic!("AUTH_PROVIDER must be 'jwt' or 'remote', got '{}'", other),
        };

        let quiz_delete_policy = env::var("QUIZ_DELETE_POLICY")
            .map(|v| v.parse().expect("QUIZ_DELETE_POLICY must be 'any' or 'owner'"))
            .unwrap_or_default();

        let seed_sample_quiz = env::var("SEED_SAMPLE_QUIZ")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            database_max_connections,
            bind_addr,
            cors_origins,
            auth,
            quiz_delete_policy,
            seed_sample_quiz,
            rust_log,
        }
    }
}

/// Settings for [`crate::client::ApiClient`], the quiz-taking side.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token: Option<String>,
    pub durability: SubmissionDurability,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the client settings through `lookup`, e.g. a process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("QUIZDECK_API_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .parse()
            .expect("QUIZDECK_API_URL must be a valid URL");

        let token = lookup("QUIZDECK_TOKEN").filter(|t| !t.is_empty());

        let durability = lookup("QUIZDECK_SUBMISSION_DURABILITY")
            .map(|v| {
                v.parse()
                    .expect("QUIZDECK_SUBMISSION_DURABILITY must be 'best-effort' or 'required'")
            })
            .unwrap_or_default();

        Self {
            api_url,
            token,
            durability,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
