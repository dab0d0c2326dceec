use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use lyra_core::value::Value;
use lyra_provider_azure::event_grid::config::EventSubscriptionConfig;
use lyra_provider_azure::event_grid::expand::expand_event_subscription;
use lyra_provider_azure::event_grid::flatten::flatten_event_subscription;
use lyra_provider_azure::event_grid::schema;
use lyra_provider_azure::event_grid::wire::EventSubscriptionProperties;
use lyra_provider_azure::resource_id::dev_test::{
    DevTestLabId, DevTestLabPolicyId, DevTestLabScheduleId, DevTestVirtualMachineId,
    DevTestVirtualNetworkId, ScheduleId,
};
use lyra_provider_azure::resource_id::event_grid::{
    DomainId, DomainTopicId, EventSubscriptionId, SystemTopicEventSubscriptionId, SystemTopicId,
    TopicId,
};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Azure resource ID and EventGrid translation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resource ID commands
    Id {
        #[command(subcommand)]
        command: IdCommands,
    },
    /// Validate an event subscription configuration file
    Validate {
        /// Path to configuration JSON
        file: PathBuf,
    },
    /// Translate a configuration file to the ARM wire shape
    Expand {
        /// Path to configuration JSON
        file: PathBuf,
    },
    /// Translate an ARM wire document back to configuration form
    Flatten {
        /// Path to wire JSON
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum IdCommands {
    /// Parse a resource ID and show its fields
    Parse {
        /// The resource ID
        id: String,

        /// Which ID shape to parse as
        #[arg(long, value_enum)]
        kind: IdKind,

        /// Accept non-canonical casing of static segments
        #[arg(long)]
        insensitive: bool,
    },
    /// Parse a resource ID accepting sloppy casing and print its
    /// canonical form
    Canonicalize {
        /// The resource ID
        id: String,

        /// Which ID shape to parse as
        #[arg(long, value_enum)]
        kind: IdKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IdKind {
    Domain,
    DomainTopic,
    Topic,
    SystemTopic,
    SystemTopicEventSubscription,
    EventSubscription,
    DevTestLab,
    DevTestLabSchedule,
    DevTestLabPolicy,
    DevTestVirtualNetwork,
    DevTestVirtualMachine,
    Schedule,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Id { command } => run_id_command(command),
        Commands::Validate { file } => run_validate(&file),
        Commands::Expand { file } => run_expand(&file),
        Commands::Flatten { file } => run_flatten(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_id_command(command: IdCommands) -> Result<(), String> {
    match command {
        IdCommands::Parse {
            id,
            kind,
            insensitive,
        } => run_id_parse(&id, kind, insensitive),
        IdCommands::Canonicalize { id, kind } => run_id_canonicalize(&id, kind),
    }
}

fn run_id_parse(id: &str, kind: IdKind, insensitive: bool) -> Result<(), String> {
    let fields = parse_fields(id, kind, insensitive)?;
    for (label, value) in fields {
        println!("{:<18} {}", format!("{label}:").bold(), value);
    }
    Ok(())
}

fn run_id_canonicalize(id: &str, kind: IdKind) -> Result<(), String> {
    println!("{}", canonical_form(id, kind)?);
    Ok(())
}

fn parse_fields(
    id: &str,
    kind: IdKind,
    insensitive: bool,
) -> Result<Vec<(&'static str, String)>, String> {
    match kind {
        IdKind::Domain => {
            let parsed = parse_as(id, insensitive, DomainId::parse, DomainId::parse_insensitively)?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("domain", parsed.name),
            ])
        }
        IdKind::DomainTopic => {
            let parsed = parse_as(
                id,
                insensitive,
                DomainTopicId::parse,
                DomainTopicId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("domain", parsed.domain),
                ("topic", parsed.name),
            ])
        }
        IdKind::Topic => {
            let parsed = parse_as(id, insensitive, TopicId::parse, TopicId::parse_insensitively)?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("topic", parsed.name),
            ])
        }
        IdKind::SystemTopic => {
            let parsed = parse_as(
                id,
                insensitive,
                SystemTopicId::parse,
                SystemTopicId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("system topic", parsed.name),
            ])
        }
        IdKind::SystemTopicEventSubscription => {
            let parsed = parse_as(
                id,
                insensitive,
                SystemTopicEventSubscriptionId::parse,
                SystemTopicEventSubscriptionId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("system topic", parsed.system_topic),
                ("subscription name", parsed.name),
            ])
        }
        IdKind::EventSubscription => {
            let parsed = parse_as(
                id,
                insensitive,
                EventSubscriptionId::parse,
                EventSubscriptionId::parse_insensitively,
            )?;
            Ok(vec![
                ("scope", parsed.scope),
                ("subscription name", parsed.name),
            ])
        }
        IdKind::DevTestLab => {
            let parsed = parse_as(
                id,
                insensitive,
                DevTestLabId::parse,
                DevTestLabId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("lab", parsed.name),
            ])
        }
        IdKind::DevTestLabSchedule => {
            let parsed = parse_as(
                id,
                insensitive,
                DevTestLabScheduleId::parse,
                DevTestLabScheduleId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("lab", parsed.lab_name),
                ("schedule", parsed.name),
            ])
        }
        IdKind::DevTestLabPolicy => {
            let parsed = parse_as(
                id,
                insensitive,
                DevTestLabPolicyId::parse,
                DevTestLabPolicyId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("lab", parsed.lab_name),
                ("policy set", parsed.policy_set_name),
                ("policy", parsed.name),
            ])
        }
        IdKind::DevTestVirtualNetwork => {
            let parsed = parse_as(
                id,
                insensitive,
                DevTestVirtualNetworkId::parse,
                DevTestVirtualNetworkId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("lab", parsed.lab_name),
                ("virtual network", parsed.name),
            ])
        }
        IdKind::DevTestVirtualMachine => {
            let parsed = parse_as(
                id,
                insensitive,
                DevTestVirtualMachineId::parse,
                DevTestVirtualMachineId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("lab", parsed.lab_name),
                ("virtual machine", parsed.name),
            ])
        }
        IdKind::Schedule => {
            let parsed = parse_as(
                id,
                insensitive,
                ScheduleId::parse,
                ScheduleId::parse_insensitively,
            )?;
            Ok(vec![
                ("subscription", parsed.subscription_id),
                ("resource group", parsed.resource_group),
                ("schedule", parsed.name),
            ])
        }
    }
}

/// Canonicalization accepts sloppy casing by definition, so it always
/// parses insensitively.
fn canonical_form(id: &str, kind: IdKind) -> Result<String, String> {
    match kind {
        IdKind::Domain => stringify_parse(id, DomainId::parse_insensitively),
        IdKind::DomainTopic => stringify_parse(id, DomainTopicId::parse_insensitively),
        IdKind::Topic => stringify_parse(id, TopicId::parse_insensitively),
        IdKind::SystemTopic => stringify_parse(id, SystemTopicId::parse_insensitively),
        IdKind::SystemTopicEventSubscription => {
            stringify_parse(id, SystemTopicEventSubscriptionId::parse_insensitively)
        }
        IdKind::EventSubscription => {
            stringify_parse(id, EventSubscriptionId::parse_insensitively)
        }
        IdKind::DevTestLab => stringify_parse(id, DevTestLabId::parse_insensitively),
        IdKind::DevTestLabSchedule => {
            stringify_parse(id, DevTestLabScheduleId::parse_insensitively)
        }
        IdKind::DevTestLabPolicy => stringify_parse(id, DevTestLabPolicyId::parse_insensitively),
        IdKind::DevTestVirtualNetwork => {
            stringify_parse(id, DevTestVirtualNetworkId::parse_insensitively)
        }
        IdKind::DevTestVirtualMachine => {
            stringify_parse(id, DevTestVirtualMachineId::parse_insensitively)
        }
        IdKind::Schedule => stringify_parse(id, ScheduleId::parse_insensitively),
    }
}

fn stringify_parse<T: std::fmt::Display, E: std::fmt::Display>(
    id: &str,
    parse: fn(&str) -> Result<T, E>,
) -> Result<String, String> {
    parse(id).map(|p| p.to_string()).map_err(|e| e.to_string())
}

fn parse_as<T, E: std::fmt::Display>(
    id: &str,
    insensitive: bool,
    strict: fn(&str) -> Result<T, E>,
    loose: fn(&str) -> Result<T, E>,
) -> Result<T, String> {
    let parse = if insensitive { loose } else { strict };
    parse(id).map_err(|e| e.to_string())
}

fn run_validate(file: &PathBuf) -> Result<(), String> {
    let value = load_value(file)?;
    let Value::Map(attributes) = &value else {
        return Err(format!("{}: expected a JSON object", file.display()));
    };

    if let Err(errors) = schema::event_subscription().validate(attributes) {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("\n"));
    }

    // Schema validation checks attribute shapes; decoding and expanding
    // additionally enforces the cross-attribute rules.
    let config =
        EventSubscriptionConfig::from_value(&value).map_err(|e| e.to_string())?;
    expand_event_subscription(&config).map_err(|e| e.to_string())?;

    println!("{} {}", "Valid:".green().bold(), file.display());
    Ok(())
}

fn run_expand(file: &PathBuf) -> Result<(), String> {
    let value = load_value(file)?;
    let config = EventSubscriptionConfig::from_value(&value).map_err(|e| e.to_string())?;
    let wire = expand_event_subscription(&config).map_err(|e| e.to_string())?;
    print_json(&wire)
}

fn run_flatten(file: &PathBuf) -> Result<(), String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let wire: EventSubscriptionProperties = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", file.display(), e))?;
    let config = flatten_event_subscription(&wire);
    print_json(&config)
}

fn load_value(file: &PathBuf) -> Result<Value, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", file.display(), e))?;
    Ok(Value::from(json))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}
