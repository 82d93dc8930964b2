//! Registration client for digitalSTROM servers.
//!
//! Registering an application is a three step exchange against the server's
//! JSON API:
//!
//! 1. `system/requestApplicationToken` mints a (still disabled) application token
//! 2. `system/login` opens a session with the account's credentials
//! 3. `system/enableToken` activates the application token for that session
//!
//! Every response is wrapped as `{"ok": bool, "message": ..., "result": {...}}`.

use crate::error::{BatchError, RegistrationError};
use log::debug;
use reqwest::blocking::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

/// Application name shown in the access-rights view of the remote system.
pub const APP_NAME: &str = "foresight-connctd";

/// Something that can register an application on one remote account.
pub trait Registrar {
    /// Registers `app_name` on `endpoint` using the account credentials and
    /// returns the issued application token.
    ///
    /// Business rejections (bad credentials, ...) are errors like any other.
    /// Calls are not idempotent: a second call may mint a second token.
    fn register(
        &self,
        endpoint: &str,
        user: &str,
        secret: &str,
        app_name: &str,
    ) -> Result<String, RegistrationError>;
}

impl<R: Registrar + ?Sized> Registrar for &R {
    fn register(
        &self,
        endpoint: &str,
        user: &str,
        secret: &str,
        app_name: &str,
    ) -> Result<String, RegistrationError> {
        (**self).register(endpoint, user, secret, app_name)
    }
}

/// Response envelope shared by every JSON API call.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    message: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationTokenResult {
    application_token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
}

/// Returns the payload of an `ok` response.
fn decode_result<T: DeserializeOwned>(body: &str) -> Result<T, RegistrationError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| RegistrationError::Protocol(format!("invalid JSON ({})", e)))?;
    if !envelope.ok {
        return Err(rejection(envelope.message));
    }
    envelope
        .result
        .ok_or_else(|| RegistrationError::Protocol("response has no result".to_string()))
}

/// Accepts any `ok` response, with or without payload.
fn decode_ack(body: &str) -> Result<(), RegistrationError> {
    let envelope: Envelope<IgnoredAny> = serde_json::from_str(body)
        .map_err(|e| RegistrationError::Protocol(format!("invalid JSON ({})", e)))?;
    if envelope.ok {
        Ok(())
    } else {
        Err(rejection(envelope.message))
    }
}

fn rejection(message: Option<String>) -> RegistrationError {
    match message {
        Some(m) if !m.is_empty() => RegistrationError::Rejected(m),
        _ => RegistrationError::Rejected("request rejected by remote system".to_string()),
    }
}

/// Production [`Registrar`] talking HTTPS to digitalSTROM servers.
///
/// digitalSTROM servers ship self-signed certificates, so this client
/// accepts any server certificate. That policy is confined to the HTTP client
/// built in [`DigitalStromClient::new`] and is not used for anything else.
#[derive(Debug, Clone)]
pub struct DigitalStromClient {
    http: Client,
}

impl DigitalStromClient {
    /// Builds the client with certificate validation disabled.
    pub fn new() -> Result<Self, BatchError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(BatchError::HttpClient)?;
        Ok(DigitalStromClient { http })
    }

    /// Performs one GET against `<endpoint>/json/system/<method>` and
    /// returns the body of a 2xx response.
    fn call(
        &self,
        endpoint: &str,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<String, RegistrationError> {
        let url = format!("{}/json/system/{}", endpoint.trim_end_matches('/'), method);
        debug!("GET {}", url);

        let response = self.http.get(&url).query(query).send()?;
        let status = response.status();
        let body = response.text()?;
        debug!("{} answered {}", url, status);

        if status.is_success() {
            return Ok(body);
        }

        // Failed logins come back as 4xx with the usual envelope.
        match serde_json::from_str::<Envelope<IgnoredAny>>(&body) {
            Ok(envelope) if !envelope.ok => Err(rejection(envelope.message)),
            _ => Err(RegistrationError::Http {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl Registrar for DigitalStromClient {
    fn register(
        &self,
        endpoint: &str,
        user: &str,
        secret: &str,
        app_name: &str,
    ) -> Result<String, RegistrationError> {
        let body = self.call(
            endpoint,
            "requestApplicationToken",
            &[("applicationName", app_name)],
        )?;
        let app_token = decode_result::<ApplicationTokenResult>(&body)?.application_token;

        let body = self.call(endpoint, "login", &[("user", user), ("password", secret)])?;
        let session = decode_result::<LoginResult>(&body)?.token;

        let body = self.call(
            endpoint,
            "enableToken",
            &[("applicationToken", app_token.as_str()), ("token", session.as_str())],
        )?;
        decode_ack(&body)?;

        Ok(app_token)
    }
}
