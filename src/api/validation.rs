//! Field-level validation for film and account payloads
//!
//! Every text field is trimmed and HTML-escaped before any rule runs, and the
//! sanitized value is the one persisted. All failing fields are reported, not
//! just the first.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::ValidationLimits;
use crate::store::Fields;

pub const FILM_FIELDS: [&str; 5] = ["titre", "description", "annee", "realisation", "titreVignette"];

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?([0-9]*[.])?[0-9]+$").expect("numeric pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern")
});

const PASSWORD_SYMBOLS: &str = "-#!$@£%^&*()_+|~=`{}[]:\";'<>?,./\\ ";
const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Sanitized registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub courriel: String,
    pub mdp: String,
}

/// HTML-escape the characters browsers treat as markup or attribute delimiters
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

pub fn sanitize(input: &str) -> String {
    escape_html(input.trim())
}

/// Text form of a scalar body field; absent and null read as empty.
/// Arrays and objects have no text form.
fn field_text(body: &Fields, name: &str) -> Option<String> {
    match body.get(name) {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    }
}

fn sanitized_field(
    body: &Fields,
    name: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match field_text(body, name) {
        Some(text) => Some(sanitize(&text)),
        None => {
            errors.push(FieldError::new(name, "must be a string or a number"));
            None
        }
    }
}

pub fn is_numeric(value: &str) -> bool {
    NUMERIC.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LEN {
        return false;
    }
    match value.rsplit_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL.is_match(value),
        _ => false,
    }
}

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];
const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il", "hotmail.co.nz",
    "hotmail.co.th", "hotmail.co.uk", "hotmail.com", "hotmail.com.ar", "hotmail.com.au",
    "hotmail.com.br", "hotmail.com.gr", "hotmail.com.mx", "hotmail.com.pe", "hotmail.com.tr",
    "hotmail.com.vn", "hotmail.cz", "hotmail.de", "hotmail.dk", "hotmail.es", "hotmail.fr",
    "hotmail.hu", "hotmail.id", "hotmail.ie", "hotmail.in", "hotmail.it", "hotmail.jp",
    "hotmail.kr", "hotmail.lv", "hotmail.my", "hotmail.ph", "hotmail.pt", "hotmail.sa",
    "hotmail.sg", "hotmail.sk", "live.be", "live.co.uk", "live.com", "live.com.ar",
    "live.com.mx", "live.de", "live.es", "live.eu", "live.fr", "live.it", "live.nl", "msn.com",
    "outlook.at", "outlook.be", "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th",
    "outlook.com", "outlook.com.ar", "outlook.com.au", "outlook.com.br", "outlook.com.gr",
    "outlook.com.pe", "outlook.com.tr", "outlook.com.vn", "outlook.cz", "outlook.de",
    "outlook.dk", "outlook.es", "outlook.fr", "outlook.hu", "outlook.id", "outlook.ie",
    "outlook.in", "outlook.it", "outlook.jp", "outlook.kr", "outlook.lv", "outlook.my",
    "outlook.ph", "outlook.pt", "outlook.sa", "outlook.sg", "outlook.sk", "passport.com",
];
const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de", "yahoo.fr",
    "yahoo.in", "yahoo.it", "ymail.com",
];
const YANDEX_DOMAINS: &[&str] = &["yandex.ru", "yandex.ua", "yandex.kz", "yandex.com", "yandex.by", "ya.ru"];

/// Canonical form of a valid address, or `None` when provider rules leave
/// nothing of the local part
///
/// Everything is lower-cased. Gmail drops `+tags` and dots and folds
/// googlemail.com into gmail.com. Outlook and iCloud drop `+tags`. Yahoo drops
/// the last `-tag`. Yandex aliases fold into yandex.ru.
pub fn normalize_email(email: &str) -> Option<String> {
    let (local, domain) = email.rsplit_once('@')?;
    let domain = domain.to_lowercase();
    let local = local.to_lowercase();
    let before_plus = |local: &str| local.split('+').next().unwrap_or_default().to_string();

    let (local, domain) = if GMAIL_DOMAINS.contains(&domain.as_str()) {
        (before_plus(&local).replace('.', ""), "gmail.com".to_string())
    } else if ICLOUD_DOMAINS.contains(&domain.as_str()) || OUTLOOK_DOMAINS.contains(&domain.as_str()) {
        (before_plus(&local), domain)
    } else if YAHOO_DOMAINS.contains(&domain.as_str()) {
        let local = match local.rsplit_once('-') {
            Some((head, _)) => head.to_string(),
            None => local,
        };
        (local, domain)
    } else if YANDEX_DOMAINS.contains(&domain.as_str()) {
        (local, "yandex.ru".to_string())
    } else {
        (local, domain)
    };

    if local.is_empty() {
        return None;
    }
    Some(format!("{}@{}", local, domain))
}

pub fn is_strong_password(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

fn require_non_empty(
    value: &str,
    field: &'static str,
    message: &str,
    errors: &mut Vec<FieldError>,
) {
    if value.is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

/// Validate a film payload and return the sanitized film fields
pub fn validate_film(body: &Fields, limits: &ValidationLimits) -> Result<Fields, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut film = Fields::new();

    for name in FILM_FIELDS {
        let Some(value) = sanitized_field(body, name, &mut errors) else {
            continue;
        };

        match name {
            "titre" => require_non_empty(&value, name, "Film title is required.", &mut errors),
            "description" => {
                if value.chars().count() < limits.description_min_chars {
                    errors.push(FieldError::new(
                        name,
                        format!(
                            "Description must be at least {} characters.",
                            limits.description_min_chars
                        ),
                    ));
                }
            }
            "annee" => {
                if value.is_empty() || !is_numeric(&value) {
                    errors.push(FieldError::new(name, "Year must be numeric."));
                }
            }
            "realisation" => {
                require_non_empty(&value, name, "Director name is required.", &mut errors)
            }
            _ => require_non_empty(&value, name, "Thumbnail title is required.", &mut errors),
        }

        film.insert(name.to_string(), Value::String(value));
    }

    if errors.is_empty() {
        Ok(film)
    } else {
        Err(errors)
    }
}

/// Validate a registration payload
pub fn validate_registration(
    body: &Fields,
    limits: &ValidationLimits,
) -> Result<Credentials, Vec<FieldError>> {
    let mut errors = Vec::new();

    let courriel = sanitized_field(body, "courriel", &mut errors).and_then(|email| {
        let normalized = is_email(&email).then(|| normalize_email(&email)).flatten();
        if normalized.is_none() {
            errors.push(FieldError::new("courriel", "A valid email address is required."));
        }
        normalized
    });

    let mdp = sanitized_field(body, "mdp", &mut errors).and_then(|password| {
        let length = password.chars().count();
        if length < limits.password_min_chars || length > limits.password_max_chars {
            errors.push(FieldError::new(
                "mdp",
                format!(
                    "Password must be between {} and {} characters.",
                    limits.password_min_chars, limits.password_max_chars
                ),
            ));
            None
        } else if !is_strong_password(&password) {
            errors.push(FieldError::new(
                "mdp",
                "Password needs a lowercase letter, an uppercase letter, a digit and a symbol.",
            ));
            None
        } else {
            Some(password)
        }
    });

    match (courriel, mdp) {
        (Some(courriel), Some(mdp)) if errors.is_empty() => Ok(Credentials { courriel, mdp }),
        _ => Err(errors),
    }
}

/// Login input is sanitized like registration input but never rejected here;
/// unknown or malformed emails surface as a failed lookup.
pub fn login_credentials(body: &Fields) -> Credentials {
    let email = sanitize(&field_text(body, "courriel").unwrap_or_default());
    let courriel = is_email(&email)
        .then(|| normalize_email(&email))
        .flatten()
        .unwrap_or(email);
    let mdp = sanitize(&field_text(body, "mdp").unwrap_or_default());
    Credentials { courriel, mdp }
}
