//! Error display for the CLI.

use colored::Colorize;
use registry_audit::{Error, ValidationError};

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint_for(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return match validation {
            ValidationError::UnknownEventType(_) => Some(
                "The record was written with a newer schema. Run `decode` without --validate to inspect it.",
            ),
            _ if validation.is_integrity_error() => {
                Some("The event type and its payload disagree; the producer is misbehaving.")
            }
            _ => None,
        };
    }

    match err.downcast_ref::<Error>()? {
        Error::Decode(_) => {
            Some("Check that --wire-format matches the input (binary or hex).")
        }
        Error::Json(message) if message.contains("unknown field") => {
            Some("Pass --ignore-unknown-fields to skip keys this build does not know.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_hint_survives_context() {
        let err = Err::<(), _>(ValidationError::UnknownEventType(2))
            .context("audit event failed validation")
            .unwrap_err();
        assert!(hint_for(&err).unwrap().contains("newer schema"));
    }

    #[test]
    fn test_payload_on_unspecified_type_gets_integrity_hint() {
        let mut event = registry_audit::Event::default();
        event.set_payload(registry_audit::PayloadOrganizationCreated::default());
        let err = event
            .validate()
            .context("audit event failed validation")
            .unwrap_err();
        assert!(hint_for(&err).unwrap().contains("producer is misbehaving"));
    }

    #[test]
    fn test_decode_error_hint() {
        let decode = registry_audit::decode(&[0x0au8, 0x05][..]).unwrap_err();
        let err = anyhow::Error::new(decode).context("failed to decode audit event");
        assert!(hint_for(&err).unwrap().contains("--wire-format"));
    }

    #[test]
    fn test_plain_errors_have_no_hint() {
        assert!(hint_for(&anyhow::anyhow!("boom")).is_none());
    }
}
