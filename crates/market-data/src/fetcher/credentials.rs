use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Marketplace;

/// Source of bearer tokens for marketplace accounts.
///
/// The OAuth handshake lives elsewhere; this crate only asks for a token that
/// is valid right now.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self, marketplace: Marketplace) -> Result<String, MarketDataError>;
}

/// Tokens fixed at startup (env configuration, tests).
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    tokens: HashMap<Marketplace, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, marketplace: Marketplace, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.trim().is_empty() {
            self.tokens.insert(marketplace, token);
        }
        self
    }

    pub fn has_token(&self, marketplace: Marketplace) -> bool {
        self.tokens.contains_key(&marketplace)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self, marketplace: Marketplace) -> Result<String, MarketDataError> {
        self.tokens
            .get(&marketplace)
            .cloned()
            .ok_or_else(|| MarketDataError::Unauthorized {
                provider: marketplace.to_string(),
                message: "no access token configured".to_string(),
            })
    }
}
