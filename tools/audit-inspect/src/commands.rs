//! CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use registry_audit::{codec, json, DecodeOptions, Event, JsonOptions};

use crate::io::{self, WireFormat};

/// Decode, encode and validate registry audit events offline.
#[derive(Debug, Parser)]
#[command(name = "audit-inspect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// How binary records are read and written.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = WireFormat::Binary,
        env = "AUDIT_WIRE_FORMAT"
    )]
    wire_format: WireFormat,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn", env = "AUDIT_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode a binary record and print it as JSON.
    Decode(DecodeArgs),

    /// Encode a JSON record into its binary form.
    Encode(EncodeArgs),

    /// Decode a binary record and check that its type and payload agree.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Input file. Reads stdin when omitted or `-`.
    file: Option<PathBuf>,

    /// Render fields that hold their default value.
    #[arg(long)]
    emit_defaults: bool,

    /// Render enums as numbers instead of names.
    #[arg(long)]
    enum_as_number: bool,

    /// Drop fields this build does not know before rendering.
    #[arg(long)]
    discard_unknown: bool,

    /// Fail if the type and payload disagree.
    #[arg(long)]
    validate: bool,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Input file (JSON). Reads stdin when omitted or `-`.
    file: Option<PathBuf>,

    /// Skip keys this build does not know instead of failing.
    #[arg(long)]
    ignore_unknown_fields: bool,

    /// Fail if the type and payload disagree.
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Input file. Reads stdin when omitted or `-`.
    file: Option<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Decode(args) => decode(self.wire_format, args),
            Commands::Encode(args) => encode(self.wire_format, args),
            Commands::Validate(args) => validate(self.wire_format, args),
        }
    }
}

fn read_record(file: Option<&Path>, format: WireFormat, options: &DecodeOptions) -> Result<Event> {
    let raw = io::read_source(file)?;
    let bytes = io::decode_wire(raw, format)?;
    let event =
        codec::decode_with(bytes.as_slice(), options).context("failed to decode audit event")?;
    tracing::debug!(
        event_id = %event.event_id,
        event_type = %event.type_name(),
        bytes = bytes.len(),
        "decoded audit event"
    );
    Ok(event)
}

fn check(event: &Event) -> Result<()> {
    event
        .validate()
        .with_context(|| format!("audit event '{}' failed validation", event.event_id))
}

fn decode(format: WireFormat, args: DecodeArgs) -> Result<()> {
    let options = DecodeOptions::default().discard_unknown_fields(args.discard_unknown);
    let event = read_record(args.file.as_deref(), format, &options)?;
    if args.validate {
        check(&event)?;
    }
    if event.has_unknown_fields() {
        tracing::info!(
            unknown_fields = event.unknown_fields.len(),
            "record carries fields with no JSON form; they are not printed"
        );
    }

    let json_options = JsonOptions {
        emit_defaults: args.emit_defaults,
        enum_as_number: args.enum_as_number,
        ..Default::default()
    };
    let text = if args.compact {
        json::to_string(&event, &json_options)?
    } else {
        json::to_string_pretty(&event, &json_options)?
    };
    println!("{}", text);
    Ok(())
}

fn encode(format: WireFormat, args: EncodeArgs) -> Result<()> {
    let raw = io::read_source(args.file.as_deref())?;
    let text = String::from_utf8(raw).context("JSON input is not valid UTF-8")?;
    let options = JsonOptions {
        ignore_unknown_fields: args.ignore_unknown_fields,
        ..Default::default()
    };
    let event = json::from_str(&text, &options).context("failed to parse audit event JSON")?;
    if args.validate {
        check(&event)?;
    }

    let bytes = codec::encode_to_vec(&event);
    tracing::debug!(event_id = %event.event_id, bytes = bytes.len(), "encoded audit event");
    io::write_stdout(&io::encode_wire(&bytes, format))
}

fn validate(format: WireFormat, args: ValidateArgs) -> Result<()> {
    let event = read_record(args.file.as_deref(), format, &DecodeOptions::default())?;
    check(&event)?;
    println!(
        "{} {} ({})",
        "Valid:".green().bold(),
        event.event_id,
        event.type_name()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decode_flags() {
        let cli = Cli::try_parse_from([
            "audit-inspect",
            "--wire-format",
            "hex",
            "decode",
            "event.hex",
            "--emit-defaults",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.wire_format, WireFormat::Hex);
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.file, Some(PathBuf::from("event.hex")));
                assert!(args.emit_defaults);
                assert!(args.validate);
                assert!(!args.enum_as_number);
                assert!(!args.compact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["audit-inspect", "validate", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        match cli.command {
            Commands::Validate(args) => assert!(args.file.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_wire_format_is_rejected() {
        assert!(Cli::try_parse_from(["audit-inspect", "--wire-format", "base64", "decode"]).is_err());
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["audit-inspect"]).is_err());
    }

    #[test]
    fn test_check_wraps_validation_error() {
        let event = Event {
            event_id: "e1".to_string(),
            ..Default::default()
        };
        let err = check(&event).unwrap_err();
        assert!(err.to_string().contains("'e1'"));
        assert!(err.downcast_ref::<registry_audit::ValidationError>().is_some());
    }
}
