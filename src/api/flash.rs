use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

const FLASH_COOKIE: &str = "flash";

/// Bootstrap alert flavour of a one-shot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Garbage in the cookie yields no messages.
pub fn decode(raw: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Queues a message for the next rendered page.
pub fn push(cookies: &Cookies, level: FlashLevel, text: impl Into<String>) {
    let mut messages = cookies
        .get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default();
    messages.push(FlashMessage { level, text: text.into() });

    let mut cookie = Cookie::new(FLASH_COOKIE, encode(&messages));
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookies.add(cookie);
}

pub fn take(cookies: &Cookies) -> Vec<FlashMessage> {
    match cookies.get(FLASH_COOKIE) {
        Some(cookie) => {
            let messages = decode(cookie.value());
            cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").into());
            messages
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_carries_accents() {
        let messages = vec![
            FlashMessage { level: FlashLevel::Warning, text: "Ya tienes una solicitud de reembolso pendiente.".into() },
            FlashMessage { level: FlashLevel::Success, text: "Calificación guardada".into() },
        ];
        let raw = encode(&messages);

        assert!(raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&raw), messages);
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        assert!(decode("not base64 !!").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode(b"{\"nope\":1}")).is_empty());
    }
}
