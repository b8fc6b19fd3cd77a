//! JSON:API document validation CLI.
//!
//! Validates a JSON:API document against a fixture record set, reporting
//! protocol error objects for every violation found.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jsonapi_validate::{
    default_templates, Adapter, ErrorRepository, ErrorTemplate, ResourceIdentifier, Store,
    ValidateError, ValidationError, ValidatorErrorFactory, ValidatorFactory,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "jsonapi-validate")]
#[command(about = "Validate JSON:API documents against a fixture record set")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document
    Check {
        /// Document file to validate
        document: PathBuf,

        /// Fixture records: JSON map of type -> { id -> record }
        #[arg(long)]
        records: Option<PathBuf>,

        /// Register a resource type with no records
        #[arg(long = "known-type")]
        known_types: Vec<String>,

        /// Expected resource type of the document's primary data
        #[arg(long = "type")]
        expected_type: Option<String>,

        /// Expected resource id of the document's primary data
        #[arg(long = "id")]
        expected_id: Option<String>,

        /// Error template config JSON, merged over the defaults
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Validate as a relationship document instead of a resource document
        #[arg(long)]
        relationship: bool,

        /// Allow an empty relationship (relationship documents only)
        #[arg(long)]
        allow_empty: bool,

        /// Output errors as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Print the default error template table as JSON
    Templates {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            document,
            records,
            known_types,
            expected_type,
            expected_id,
            templates,
            relationship,
            allow_empty,
            json,
        } => run_check(CheckArgs {
            document,
            records,
            known_types,
            expected_type,
            expected_id,
            templates,
            relationship,
            allow_empty,
            json_output: json,
        }),

        Commands::Templates { pretty } => run_templates(pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct CheckArgs {
    document: PathBuf,
    records: Option<PathBuf>,
    known_types: Vec<String>,
    expected_type: Option<String>,
    expected_id: Option<String>,
    templates: Option<PathBuf>,
    relationship: bool,
    allow_empty: bool,
    json_output: bool,
}

/// Adapter answering from an in-memory record map loaded off disk.
struct FixtureAdapter {
    resource_type: String,
    records: HashMap<String, Value>,
}

impl Adapter for FixtureAdapter {
    fn recognises(&self, resource_type: &str) -> bool {
        resource_type == self.resource_type
    }

    fn exists(&self, identifier: &ResourceIdentifier) -> bool {
        identifier
            .id()
            .is_some_and(|id| self.records.contains_key(id))
    }

    fn find(&self, identifier: &ResourceIdentifier) -> Option<Value> {
        identifier.id().and_then(|id| self.records.get(id)).cloned()
    }
}

fn run_check(args: CheckArgs) -> Result<(), u8> {
    let document = load_json(&args.document)?;

    let store = build_store(args.records.as_deref(), &args.known_types)?;
    let error_factory = build_error_factory(args.templates.as_deref())?;
    let factory = ValidatorFactory::with(std::rc::Rc::new(error_factory), std::rc::Rc::new(store));

    let result = if args.relationship {
        let validator = factory.relationship_document(factory.relationship(
            args.expected_type.as_deref(),
            args.allow_empty,
            None,
        ));
        validator.validate(&document, None)
    } else {
        // Every relationship in the document is checked against the fixture
        // store; types and existence, with empties allowed.
        let mut relationships = factory.relationships();
        relationships.fallback(Box::new(factory.relationship(None, true, None)));

        let validator = factory.resource_document(factory.resource_with(
            args.expected_type.as_deref(),
            args.expected_id.as_deref(),
            None,
            relationships,
        ));
        validator.validate(&document, None)
    };

    match result {
        Ok(()) => {
            if !args.json_output {
                println!("valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid(errors)) => {
            if args.json_output {
                let rendered = serde_json::to_string(&errors).map_err(|e| {
                    eprintln!("Error serializing output: {}", e);
                    2u8
                })?;
                println!("{}", rendered);
            } else {
                for error in &errors {
                    eprintln!("{}", render_error(error));
                }
            }
            Err(1)
        }
        Err(ValidateError::Store(e)) => {
            eprintln!("Error: {}", e);
            Err(2)
        }
    }
}

fn run_templates(pretty: bool) -> Result<(), u8> {
    let templates = default_templates();

    let rendered = if pretty {
        serde_json::to_string_pretty(&templates)
    } else {
        serde_json::to_string(&templates)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", rendered);
    Ok(())
}

fn build_store(records: Option<&Path>, known_types: &[String]) -> Result<Store, u8> {
    let mut store = Store::new();

    if let Some(path) = records {
        let fixtures = load_json(path)?;
        let Some(by_type) = fixtures.as_object() else {
            eprintln!("Error: records file must be a JSON object of type -> id -> record");
            return Err(2);
        };

        for (resource_type, records) in by_type {
            let Some(records) = records.as_object() else {
                eprintln!(
                    "Error: records for type '{}' must be a JSON object keyed by id",
                    resource_type
                );
                return Err(2);
            };

            store.register(Box::new(FixtureAdapter {
                resource_type: resource_type.clone(),
                records: records
                    .iter()
                    .map(|(id, record)| (id.clone(), record.clone()))
                    .collect(),
            }));
        }
    }

    for resource_type in known_types {
        store.register(Box::new(FixtureAdapter {
            resource_type: resource_type.clone(),
            records: HashMap::new(),
        }));
    }

    Ok(store)
}

fn build_error_factory(templates: Option<&Path>) -> Result<ValidatorErrorFactory, u8> {
    let mut repository = ErrorRepository::new();
    repository.configure(default_templates());

    if let Some(path) = templates {
        let config = load_json(path)?;
        let overrides: HashMap<String, ErrorTemplate> = serde_json::from_value(config)
            .map_err(|e| {
                eprintln!("Error: invalid template config: {}", e);
                2u8
            })?;
        repository.configure(overrides);
    }

    Ok(ValidatorErrorFactory::with_repository(repository))
}

fn load_json(path: &Path) -> Result<Value, u8> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: cannot read {}: {}", path.display(), e);
        3u8
    })?;

    serde_json::from_str(&content).map_err(|e| {
        eprintln!("Error: invalid JSON in {}: {}", path.display(), e);
        3u8
    })
}

fn render_error(error: &ValidationError) -> String {
    let pointer = error.pointer().unwrap_or("-");
    let title = error.title.as_deref().unwrap_or("Invalid");
    match &error.detail {
        Some(detail) => format!("{}: {}: {}", pointer, title, detail),
        None => format!("{}: {}", pointer, title),
    }
}
