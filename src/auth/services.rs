use std::time::Duration;

use axum::extract::FromRef;
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sha2::Sha256;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::accounts::repo_types::Account;
use crate::auth::claims::{Claims, TokenKind};
use crate::config::JwtConfig;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    hash_key: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_minutes as u64) * 60),
            hash_key: secret,
        }
    }
}

impl JwtKeys {
    /// Keyed fingerprint of a stored password hash. Tokens embed this; a
    /// token only identifies a session while the fingerprint still matches
    /// the account's current hash.
    pub fn session_auth_hash(&self, password_hash: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.hash_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(password_hash.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn sign_with_kind(&self, account: &Account, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: account.id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            auth_hash: self.session_auth_hash(&account.password_hash),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id = %account.id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, account: &Account) -> anyhow::Result<String> {
        self.sign_with_kind(account, TokenKind::Access)
    }
    pub fn sign_refresh(&self, account: &Account) -> anyhow::Result<String> {
        self.sign_with_kind(account, TokenKind::Refresh)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(account_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }

    /// Check a verified claim set against the account it names.
    pub fn is_current(&self, claims: &Claims, account: &Account) -> bool {
        claims.sub == account.id
            && claims.auth_hash == self.session_auth_hash(&account.password_hash)
    }
}
