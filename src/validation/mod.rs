//! Form validation for client records.
//!
//! Validation is all-or-nothing: a [`ClientForm`] either yields a fully valid
//! [`Client`] or a [`ValidationErrors`] map covering every failing field in a
//! single pass. Partially valid records never reach the store.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::models::{Client, ClientForm};

/// Minimum number of characters in a phone number after the optional `+`.
const PHONE_MIN_LEN: usize = 10;

/// Field-scoped validation errors, keyed by the frontend field name.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message attached to a field, if that field failed.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// Validate raw form input, producing a complete client record or the full
/// set of field errors.
///
/// Passing `existing` marks this as an edit: the original `id` and
/// `created_at` are preserved. A new record gets a fresh UUID and a creation
/// timestamp at call time.
pub fn validate(form: &ClientForm, existing: Option<&Client>) -> Result<Client, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.first_name.trim().is_empty() {
        errors.add("firstName", "Nome é obrigatório");
    }

    if form.last_name.trim().is_empty() {
        errors.add("lastName", "Sobrenome é obrigatório");
    }

    if form.parent_name.trim().is_empty() {
        errors.add("parentName", "Nome do responsável é obrigatório");
    }

    if form.phone_number.trim().is_empty() {
        errors.add("phoneNumber", "Número de telefone é obrigatório");
    } else if !is_valid_phone(&form.phone_number) {
        errors.add("phoneNumber", "Por favor, insira um número de telefone válido");
    }

    if form.whatsapp_number.trim().is_empty() {
        errors.add("whatsappNumber", "Número do WhatsApp é obrigatório");
    } else if !is_valid_phone(&form.whatsapp_number) {
        errors.add("whatsappNumber", "Por favor, insira um número de WhatsApp válido");
    }

    if !form.instagram.is_empty() && !form.instagram.contains('@') {
        errors.add("instagram", "O usuário do Instagram deve incluir @");
    }

    if !form.tiktok.is_empty() && !form.tiktok.contains('@') {
        errors.add("tiktok", "O usuário do TikTok deve incluir @");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let (id, created_at) = match existing {
        Some(client) => (client.id.clone(), client.created_at.clone()),
        None => (
            uuid::Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339(),
        ),
    };

    Ok(Client {
        id,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        parent_name: form.parent_name.clone(),
        instagram: form.instagram.clone(),
        tiktok: form.tiktok.clone(),
        phone_number: form.phone_number.clone(),
        whatsapp_number: form.whatsapp_number.clone(),
        notes: form.notes.clone(),
        created_at,
    })
}

/// Loose phone pattern: optional leading `+`, then at least [`PHONE_MIN_LEN`]
/// characters drawn from digits, whitespace, `-`, `(`, `)`.
fn is_valid_phone(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    rest.chars().count() >= PHONE_MIN_LEN
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ClientForm {
        ClientForm {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            parent_name: "Bia".to_string(),
            instagram: "@ana".to_string(),
            tiktok: String::new(),
            phone_number: "11999999999".to_string(),
            whatsapp_number: "(11) 99999-9999".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_form_creates_record() {
        let client = validate(&valid_form(), None).unwrap();
        assert_eq!(client.first_name, "Ana");
        assert!(!client.id.is_empty());
        assert!(!client.created_at.is_empty());
    }

    #[test]
    fn test_missing_last_name_flags_only_that_field() {
        let mut form = valid_form();
        form.last_name = String::new();

        let errors = validate(&form, None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.field("lastName"), Some("Sobrenome é obrigatório"));
    }

    #[test]
    fn test_whitespace_only_names_are_empty() {
        let mut form = valid_form();
        form.first_name = "   ".to_string();
        form.parent_name = "\t".to_string();

        let errors = validate(&form, None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.field("firstName").is_some());
        assert!(errors.field("parentName").is_some());
    }

    #[test]
    fn test_multiple_failures_reported_together() {
        let form = ClientForm::default();

        let errors = validate(&form, None).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.field("firstName").is_some());
        assert!(errors.field("lastName").is_some());
        assert!(errors.field("parentName").is_some());
        assert_eq!(
            errors.field("phoneNumber"),
            Some("Número de telefone é obrigatório")
        );
        assert_eq!(
            errors.field("whatsappNumber"),
            Some("Número do WhatsApp é obrigatório")
        );
    }

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("11999999999"));
        assert!(is_valid_phone("+55 (11) 99999-9999"));
        assert!(is_valid_phone("1234567890"));
        // Too short after the optional plus
        assert!(!is_valid_phone("+123456789"));
        assert!(!is_valid_phone("123"));
        // Disallowed characters
        assert!(!is_valid_phone("11999999999x"));
        assert!(!is_valid_phone("abcdefghij"));
    }

    #[test]
    fn test_malformed_phone_gets_specific_message() {
        let mut form = valid_form();
        form.phone_number = "12-34".to_string();

        let errors = validate(&form, None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.field("phoneNumber"),
            Some("Por favor, insira um número de telefone válido")
        );
    }

    #[test]
    fn test_social_handles_require_at_sign() {
        let mut form = valid_form();
        form.instagram = "ana".to_string();
        form.tiktok = "ana.dances".to_string();

        let errors = validate(&form, None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.field("instagram"),
            Some("O usuário do Instagram deve incluir @")
        );
        assert_eq!(
            errors.field("tiktok"),
            Some("O usuário do TikTok deve incluir @")
        );
    }

    #[test]
    fn test_empty_social_handles_are_valid() {
        let mut form = valid_form();
        form.instagram = String::new();
        form.tiktok = String::new();

        assert!(validate(&form, None).is_ok());
    }

    #[test]
    fn test_notes_never_rejected() {
        let mut form = valid_form();
        form.notes = "qualquer coisa, \"com aspas\", vírgulas e\nquebras".to_string();

        assert!(validate(&form, None).is_ok());
    }

    #[test]
    fn test_edit_preserves_id_and_created_at() {
        let original = validate(&valid_form(), None).unwrap();

        let mut form = valid_form();
        form.first_name = "Ana Clara".to_string();

        let edited = validate(&form, Some(&original)).unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.first_name, "Ana Clara");
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = validate(&valid_form(), None).unwrap();
        let b = validate(&valid_form(), None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut form = valid_form();
        form.last_name = String::new();

        let errors = validate(&form, None).unwrap_err();
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["lastName"], "Sobrenome é obrigatório");
    }
}
