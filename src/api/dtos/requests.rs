use std::collections::BTreeMap;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::models::{
    comment::COMMENT_TITLE_MAX,
    notification::Priority,
    rating::{RATING_MAX, RATING_MIN, RATING_TEXT_MAX, RATING_TITLE_MAX},
    ticket::TicketType,
};
use crate::domain::services::formatting::parse_local_datetime;

pub const NON_FIELD: &str = "non_field";

/// Field name to first error message, rendered next to each input.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn with(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

fn require(errors: &mut FormErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn max_chars(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        errors.add(field, format!("Máximo {} caracteres.", max));
    }
}

/// Checkboxes post "on" when ticked and nothing otherwise.
fn checked(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

// Accounts

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    pub is_organizer: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub password_confirm: String,
}

impl RegisterForm {
    pub fn is_organizer(&self) -> bool {
        checked(&self.is_organizer)
    }

    /// Uniqueness of email and username needs the database; the handler adds those.
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        require(&mut errors, "email", &self.email, "El email es requerido");
        require(&mut errors, "username", &self.username, "El nombre de usuario es requerido");
        require(&mut errors, "password", &self.password, "La contraseña es requerida");
        require(&mut errors, "password_confirm", &self.password_confirm, "La confirmación de contraseña es requerida");
        if !self.password.is_empty() && !self.password_confirm.is_empty() && self.password != self.password_confirm {
            errors.add("password", "Las contraseñas no coinciden");
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

// Events

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    /// Empty when the organizer left it blank.
    pub location: String,
}

impl EventForm {
    pub fn validate(&self, tz: Tz) -> Result<EventInput, FormErrors> {
        let mut errors = FormErrors::new();
        require(&mut errors, "title", &self.title, "Por favor ingrese un titulo");
        require(&mut errors, "description", &self.description, "Por favor ingrese una descripcion");

        let scheduled_at = parse_local_datetime(&self.date, &self.time, tz);
        if scheduled_at.is_none() {
            if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
                errors.add("date", "Ingrese una fecha válida (AAAA-MM-DD)");
            } else {
                errors.add("time", "Ingrese una hora válida (HH:MM)");
            }
        }

        errors.into_result(|| EventInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            scheduled_at: scheduled_at.unwrap_or_default(),
            location: self.location.trim().to_string(),
        })
    }
}

// Tickets

fn parse_quantity(errors: &mut FormErrors, raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(q) if q >= 1 => q,
        Ok(_) => {
            errors.add("cantidad", "La cantidad debe ser al menos 1.");
            0
        }
        Err(_) => {
            errors.add("cantidad", "Ingrese una cantidad válida.");
            0
        }
    }
}

fn parse_ticket_type(errors: &mut FormErrors, raw: &str) -> TicketType {
    raw.trim().parse().unwrap_or_else(|_| {
        errors.add("tipo", "Seleccione un tipo de entrada válido.");
        TicketType::General
    })
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BuyTicketForm {
    #[serde(default)]
    pub cantidad: String,
    #[serde(default)]
    pub tipo: String,
    #[serde(default, skip_serializing)]
    pub numero_tarjeta: String,
    #[serde(default)]
    pub expiracion: String,
    #[serde(default, skip_serializing)]
    pub cvv: String,
    #[serde(default)]
    pub nombre_tarjeta: String,
    pub acepta_terminos: Option<String>,
    #[serde(default)]
    pub id_evento: String,
}

impl BuyTicketForm {
    /// Card fields are checked for shape only and never stored.
    pub fn validate(&self, today: NaiveDate) -> Result<(i64, TicketType), FormErrors> {
        let mut errors = FormErrors::new();
        let quantity = parse_quantity(&mut errors, &self.cantidad);
        let ticket_type = parse_ticket_type(&mut errors, &self.tipo);

        let card: String = self.numero_tarjeta.chars().filter(|c| !c.is_whitespace()).collect();
        if card.len() != 16 || !card.chars().all(|c| c.is_ascii_digit()) {
            errors.add("numero_tarjeta", "El número de tarjeta debe tener 16 dígitos.");
        }

        match parse_expiration(&self.expiracion) {
            Some((year, month)) if (year, month) < (today.year(), today.month()) => {
                errors.add("expiracion", "La tarjeta está vencida.");
            }
            Some(_) => {}
            None => errors.add("expiracion", "Use el formato MM/AA."),
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.add("cvv", "El CVV debe tener 3 o 4 dígitos.");
        }

        require(&mut errors, "nombre_tarjeta", &self.nombre_tarjeta, "Ingrese el nombre del titular.");
        max_chars(&mut errors, "nombre_tarjeta", &self.nombre_tarjeta, 100);

        if !checked(&self.acepta_terminos) {
            errors.add("acepta_terminos", "Debe aceptar los términos y condiciones.");
        }

        errors.into_result(|| (quantity, ticket_type))
    }
}

/// "MM/YY" to (year, month).
fn parse_expiration(raw: &str) -> Option<(i32, u32)> {
    let (mm, yy) = raw.trim().split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    (1..=12).contains(&month).then_some((2000 + year, month))
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TicketEditForm {
    #[serde(default)]
    pub cantidad: String,
    #[serde(default)]
    pub tipo: String,
}

impl TicketEditForm {
    pub fn validate(&self) -> Result<(i64, TicketType), FormErrors> {
        let mut errors = FormErrors::new();
        let quantity = parse_quantity(&mut errors, &self.cantidad);
        let ticket_type = parse_ticket_type(&mut errors, &self.tipo);
        errors.into_result(|| (quantity, ticket_type))
    }
}

// Refunds

pub const REFUND_REASON_MIN: usize = 10;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefundForm {
    #[serde(default)]
    pub ticket_code: String,
    #[serde(default)]
    pub reason: String,
}

impl RefundForm {
    /// Ownership of the ticket is checked by the handler.
    pub fn validate(&self) -> Result<(i64, String), FormErrors> {
        let mut errors = FormErrors::new();
        let code = self.ticket_code.trim();
        let ticket_code = if code.is_empty() {
            errors.add("ticket_code", "El código de ticket es requerido.");
            0
        } else if !code.chars().all(|c| c.is_ascii_digit()) {
            errors.add("ticket_code", "El código de ticket debe ser numérico.");
            0
        } else {
            code.parse::<i64>().unwrap_or_else(|_| {
                errors.add("ticket_code", "El código de ticket debe ser numérico.");
                0
            })
        };

        let reason = self.reason.trim();
        if reason.is_empty() {
            errors.add("reason", "El motivo es requerido.");
        } else if reason.chars().count() < REFUND_REASON_MIN {
            errors.add("reason", format!("El motivo debe tener al menos {} caracteres.", REFUND_REASON_MIN));
        }

        errors.into_result(|| (ticket_code, reason.to_string()))
    }
}

// Comments

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        require(&mut errors, "title", &self.title, "El título es requerido.");
        max_chars(&mut errors, "title", &self.title, COMMENT_TITLE_MAX);
        require(&mut errors, "text", &self.text, "El comentario es requerido.");
        errors.into_result(|| (self.title.trim().to_string(), self.text.trim().to_string()))
    }
}

// Ratings

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RatingForm {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingInput {
    pub title: String,
    pub text: String,
    pub rating: i64,
}

impl RatingForm {
    pub fn validate(&self) -> Result<RatingInput, FormErrors> {
        let mut errors = FormErrors::new();
        require(&mut errors, "title", &self.title, "El título es requerido.");
        max_chars(&mut errors, "title", &self.title, RATING_TITLE_MAX);
        max_chars(&mut errors, "text", &self.text, RATING_TEXT_MAX);

        let rating = match self.rating.trim().parse::<i64>() {
            Ok(r) if (RATING_MIN..=RATING_MAX).contains(&r) => r,
            _ => {
                errors.add("rating", format!("La calificación debe estar entre {} y {}.", RATING_MIN, RATING_MAX));
                0
            }
        };

        errors.into_result(|| RatingInput {
            title: self.title.trim().to_string(),
            text: self.text.trim().to_string(),
            rating,
        })
    }
}

// Notifications

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NotificationForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub recipient_type: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    /// Every ticket holder of the event.
    Everyone { event_id: i64 },
    /// A single user, optionally tied to an event.
    User { username: String, event_id: Option<i64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationInput {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub recipient: Recipient,
}

impl NotificationForm {
    /// Whether the event and user exist is checked by the handler.
    pub fn validate(&self) -> Result<NotificationInput, FormErrors> {
        let mut errors = FormErrors::new();
        require(&mut errors, "title", &self.title, "El título es requerido.");
        require(&mut errors, "message", &self.message, "El mensaje es requerido.");

        let priority = self.priority.trim().parse::<Priority>().unwrap_or_else(|_| {
            errors.add("priority", "Seleccione una prioridad válida.");
            Priority::Low
        });

        let event_id = match self.event_id.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("event_id", "Seleccione un evento válido.");
                    None
                }
            },
        };

        let recipient = match self.recipient_type.trim() {
            "todos" => match event_id {
                Some(event_id) => Some(Recipient::Everyone { event_id }),
                None => {
                    errors.add("event_id", "Seleccione el evento de la notificación.");
                    None
                }
            },
            "usuario" => {
                let username = self.username.trim();
                if username.is_empty() {
                    errors.add("username", "Ingrese el usuario destinatario.");
                    None
                } else {
                    Some(Recipient::User { username: username.to_string(), event_id })
                }
            }
            _ => {
                errors.add("recipient_type", "Seleccione el tipo de destinatario.");
                None
            }
        };

        match recipient {
            Some(recipient) if errors.is_empty() => Ok(NotificationInput {
                title: self.title.trim().to_string(),
                message: self.message.trim().to_string(),
                priority,
                recipient,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_purchase() -> BuyTicketForm {
        BuyTicketForm {
            cantidad: "2".into(),
            tipo: "VIP".into(),
            numero_tarjeta: "4111 1111 1111 1111".into(),
            expiracion: "12/30".into(),
            cvv: "123".into(),
            nombre_tarjeta: "Ana Pérez".into(),
            acepta_terminos: Some("on".into()),
            id_evento: "1".into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_register_password_mismatch() {
        let form = RegisterForm {
            email: "a@b.com".into(),
            username: "ana".into(),
            is_organizer: None,
            password: "secreto1".into(),
            password_confirm: "secreto2".into(),
        };
        let errors = form.validate();
        assert_eq!(errors.get("password"), Some("Las contraseñas no coinciden"));
        assert!(!form.is_organizer());
    }

    #[test]
    fn test_event_form_messages() {
        let form = EventForm { date: "2025-13-01".into(), time: "10:00".into(), ..Default::default() };
        let errors = form.validate(chrono_tz::UTC).unwrap_err();
        assert_eq!(errors.get("title"), Some("Por favor ingrese un titulo"));
        assert_eq!(errors.get("description"), Some("Por favor ingrese una descripcion"));
        assert!(errors.get("date").is_some());
    }

    #[test]
    fn test_event_form_keeps_blank_location() {
        let form = EventForm {
            title: " Feria ".into(),
            description: "Libros".into(),
            date: "2025-08-01".into(),
            time: "18:30".into(),
            location: "  ".into(),
        };
        let input = form.validate(chrono_tz::UTC).unwrap();
        assert_eq!(input.title, "Feria");
        assert_eq!(input.location, "");
        assert_eq!(input.scheduled_at.to_rfc3339(), "2025-08-01T18:30:00+00:00");
    }

    #[test]
    fn test_purchase_accepts_valid_card() {
        assert_eq!(valid_purchase().validate(today()).unwrap(), (2, TicketType::Vip));
    }

    #[test]
    fn test_purchase_rejects_bad_card_data() {
        let form = BuyTicketForm {
            cantidad: "0".into(),
            numero_tarjeta: "4111".into(),
            expiracion: "05/25".into(),
            cvv: "12a".into(),
            acepta_terminos: None,
            ..valid_purchase()
        };
        let errors = form.validate(today()).unwrap_err();
        for field in ["cantidad", "numero_tarjeta", "expiracion", "cvv", "acepta_terminos"] {
            assert!(errors.get(field).is_some(), "expected error on {}", field);
        }
    }

    #[test]
    fn test_expiration_current_month_is_valid() {
        let form = BuyTicketForm { expiracion: "06/25".into(), ..valid_purchase() };
        assert!(form.validate(today()).is_ok());
        assert_eq!(parse_expiration("13/25"), None);
        assert_eq!(parse_expiration("1/25"), None);
    }

    #[test]
    fn test_refund_form_rules() {
        let form = RefundForm { ticket_code: "12a".into(), reason: "corto".into() };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("ticket_code").is_some());
        assert!(errors.get("reason").unwrap().contains("10"));

        let ok = RefundForm { ticket_code: "42".into(), reason: "No puedo asistir al evento".into() };
        assert_eq!(ok.validate().unwrap().0, 42);
    }

    #[test]
    fn test_rating_bounds() {
        let form = RatingForm { title: "Bien".into(), rating: "6".into(), ..Default::default() };
        assert!(form.validate().unwrap_err().get("rating").is_some());

        let form = RatingForm { title: "Bien".into(), rating: "5".into(), ..Default::default() };
        assert_eq!(form.validate().unwrap().rating, 5);
    }

    #[test]
    fn test_comment_title_length() {
        let form = CommentForm { title: "x".repeat(31), text: "hola".into(), ..Default::default() };
        assert!(form.validate().unwrap_err().get("title").is_some());
    }

    #[test]
    fn test_notification_recipients() {
        let global = NotificationForm {
            title: "Aviso".into(),
            message: "Cambio".into(),
            priority: "HIGH".into(),
            recipient_type: "todos".into(),
            event_id: "3".into(),
            username: String::new(),
        };
        assert_eq!(global.validate().unwrap().recipient, Recipient::Everyone { event_id: 3 });

        let missing_event = NotificationForm { event_id: String::new(), ..global };
        assert!(missing_event.validate().unwrap_err().get("event_id").is_some());

        let bad_priority = NotificationForm {
            title: "Aviso".into(),
            message: "Cambio".into(),
            priority: "URGENT".into(),
            recipient_type: "usuario".into(),
            event_id: String::new(),
            username: "ana".into(),
        };
        assert!(bad_priority.validate().unwrap_err().get("priority").is_some());
    }
}
