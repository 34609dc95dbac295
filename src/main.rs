//! CLI entry point for the documentation model.
//!
//! Builds a model from declaration records and answers questions about it:
//! merged member tables, class hierarchies, member lookup and tag files.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use docgraph::display::{
    THEME, create_hierarchy_table, create_members_table, create_summary_table,
};
use docgraph::io::{ExitCode, JsonResponse, OutputFormat};
use docgraph::{
    DocError, DocumentationModel, EntityId, Pipeline, Protection, RawDocument, Settings,
    TagFileWriter,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Documentation symbol model
#[derive(Parser)]
#[command(
    name = "docgraph",
    version = env!("CARGO_PKG_VERSION"),
    about = "Build and query a cross-referenced documentation model",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Set up .docgraph directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(
        about = "Run the full pipeline over a records file",
        after_help = "Examples:\n  docgraph build records.json\n  docgraph build records.json --tagfile project.tag\n  docgraph build records.json --json"
    )]
    Build {
        /// JSON declaration records
        records: PathBuf,

        /// Also write a tag file
        #[arg(long)]
        tagfile: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Show the merged all-members table of a class")]
    Members {
        records: PathBuf,

        /// Fully qualified entity name
        entity: String,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Show base and derived classes of a class")]
    Hierarchy {
        records: PathBuf,
        entity: String,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Find the member a name refers to inside a class")]
    Lookup {
        records: PathBuf,
        entity: String,
        member: String,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Display active settings")]
    Config,
}

impl Commands {
    fn format(&self) -> OutputFormat {
        let json = match self {
            Commands::Build { json, .. }
            | Commands::Members { json, .. }
            | Commands::Hierarchy { json, .. }
            | Commands::Lookup { json, .. } => *json,
            Commands::Init { .. } | Commands::Config => false,
        };
        OutputFormat::from_json_flag(json)
    }
}

#[derive(Debug, Serialize)]
struct MemberRow {
    name: String,
    kind: &'static str,
    protection: &'static str,
    virtualness: &'static str,
    declared_in: String,
    inherited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ambiguity_scope: Option<String>,
}

#[derive(Debug, Serialize)]
struct EdgeRow {
    relation: &'static str,
    class: String,
    protection: &'static str,
    virtualness: &'static str,
    template_spec: String,
    linkable: bool,
}

#[derive(Debug, Serialize)]
struct LookupResult {
    owner: String,
    name: String,
    args: String,
    protection: Protection,
    anchor: String,
    anchorfile: String,
}

fn main() {
    let cli = Cli::parse();
    let format = cli.command.format();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => std::process::exit(report(&e, format).into()),
    };
    docgraph::logging::init(&settings.logging);

    let code = match run(&cli.command, &settings, format) {
        Ok(code) => code,
        Err(e) => report(&e, format),
    };
    if !code.is_success() {
        tracing::debug!("Exiting with {} ({})", i32::from(code), code.description());
    }
    std::process::exit(code.into());
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let loaded = match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    loaded.map_err(|e| {
        DocError::ConfigError {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Print an error the way the chosen format expects and pick the exit code.
fn report(error: &anyhow::Error, format: OutputFormat) -> ExitCode {
    let doc_error = error.downcast_ref::<DocError>();
    let code = doc_error.map_or(ExitCode::GeneralError, ExitCode::from_error);

    if format.is_json() {
        let response = match doc_error {
            Some(e) => JsonResponse::from_error(e),
            None => JsonResponse::from_error(&DocError::General(format!("{error:#}"))),
        };
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("{error:#}"),
        }
    } else {
        eprintln!("{}", THEME.error_with_icon(&format!("{error:#}")));
        if let Some(e) = doc_error {
            for suggestion in e.recovery_suggestions() {
                eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
            }
        }
    }
    code
}

fn run(command: &Commands, settings: &Settings, format: OutputFormat) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(".", *force).map_err(|e| {
                anyhow::Error::from(DocError::ConfigError {
                    reason: e.to_string(),
                })
            })?;
            println!(
                "{}",
                THEME.success_with_icon(&format!("Created configuration file at: {}", path.display()))
            );
            println!("Edit this file to customize your settings.");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("{}", THEME.apply(&THEME.header, "Current Configuration:"));
            println!("{}", "=".repeat(50));
            let text = toml::to_string_pretty(settings).context("Failed to render settings")?;
            println!("{text}");
            Ok(ExitCode::Success)
        }

        Commands::Build { records, tagfile, .. } => {
            let doc = RawDocument::from_path(records)?;
            let (model, summary) = Pipeline::from_config(settings).run(&doc);

            if let Some(path) = tagfile {
                TagFileWriter::new(&model).write_to(path)?;
            }

            if format.is_json() {
                let message = format!("Built {} entities", summary.entities);
                print_json(&JsonResponse::success(&summary).with_message(&message))?;
            } else {
                println!("{}", create_summary_table(&summary));
                if let Some(path) = tagfile {
                    println!(
                        "{}",
                        THEME.success_with_icon(&format!("Tag file written to {}", path.display()))
                    );
                }
                if summary.unresolved_bases > 0 {
                    println!(
                        "{}",
                        THEME.warning_with_icon(&format!(
                            "{} base classes could not be resolved",
                            summary.unresolved_bases
                        ))
                    );
                }
            }
            Ok(ExitCode::Success)
        }

        Commands::Members { records, entity, .. } => {
            let model = build_model(records, settings)?;
            let id = find_entity(&model, entity)?;

            if format.is_json() {
                print_json(&JsonResponse::success(member_rows(&model, id)))?;
            } else {
                println!(
                    "{} {}",
                    THEME.apply(&THEME.header, model.compound_type_string(id)),
                    THEME.apply(&THEME.code, model.display_name(id, true))
                );
                println!("{}", create_members_table(&model, id));
                println!(
                    "{} inherited",
                    THEME.apply(&THEME.number, model.count_inherited_members(id))
                );
            }
            Ok(ExitCode::Success)
        }

        Commands::Hierarchy { records, entity, .. } => {
            let model = build_model(records, settings)?;
            let id = find_entity(&model, entity)?;

            if format.is_json() {
                print_json(&JsonResponse::success(edge_rows(&model, id)))?;
            } else {
                println!(
                    "{}",
                    THEME.entity(&model.display_name(id, true), model.is_linkable(id))
                );
                println!("{}", create_hierarchy_table(&model, id));
            }
            Ok(ExitCode::Success)
        }

        Commands::Lookup {
            records,
            entity,
            member,
            ..
        } => {
            let model = build_model(records, settings)?;
            let id = find_entity(&model, entity)?;
            let found = model.get_member_by_name(id, member);
            let Some(found) = found else {
                if format.is_json() {
                    print_json(&JsonResponse::not_found("Member", member))?;
                } else {
                    eprintln!(
                        "{}",
                        THEME.warning_with_icon(&format!("No member '{member}' reachable from '{entity}'"))
                    );
                }
                return Ok(ExitCode::from_lookup(&found));
            };

            let md = model
                .member(found)
                .ok_or_else(|| DocError::General(format!("Member {found:?} vanished")))?;
            let owner = md.owner.map(|o| model.name(o).to_string()).unwrap_or_default();
            let result = LookupResult {
                anchorfile: md
                    .owner
                    .map(|o| model.output_file_base(o) + &model.options().html_file_extension)
                    .unwrap_or_default(),
                owner,
                name: md.name.to_string(),
                args: md.args_string.clone(),
                protection: md.protection,
                anchor: model.member_anchor(found),
            };

            if format.is_json() {
                print_json(&JsonResponse::success(&result))?;
            } else {
                println!(
                    "{} {}::{}{}",
                    THEME.protection(result.protection),
                    THEME.apply(&THEME.code, &result.owner),
                    THEME.apply(&THEME.emphasis, &result.name),
                    result.args
                );
                println!(
                    "  {}#{}",
                    THEME.apply(&THEME.path, &result.anchorfile),
                    result.anchor
                );
            }
            Ok(ExitCode::Success)
        }
    }
}

fn build_model(records: &Path, settings: &Settings) -> anyhow::Result<DocumentationModel> {
    let doc = RawDocument::from_path(records)?;
    let (model, _) = Pipeline::from_config(settings).run(&doc);
    Ok(model)
}

fn find_entity(model: &DocumentationModel, name: &str) -> anyhow::Result<EntityId> {
    model.find_entity(name).ok_or_else(|| {
        DocError::EntityNotFound {
            name: name.to_string(),
        }
        .into()
    })
}

fn print_json<T: Serialize>(response: &JsonResponse<T>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}

fn member_rows(model: &DocumentationModel, entity: EntityId) -> Vec<MemberRow> {
    let Some(all) = model.all_members(entity) else {
        return Vec::new();
    };
    all.iter()
        .flat_map(|(name, infos)| infos.iter().map(move |info| (name, info)))
        .filter_map(|(name, info)| {
            let md = model.member(info.member)?;
            Some(MemberRow {
                name: name.to_string(),
                kind: md.kind.as_str(),
                protection: info.protection.as_str(),
                virtualness: info.virtualness.as_str(),
                declared_in: md.owner.map(|o| model.name(o).to_string()).unwrap_or_default(),
                inherited: info.inherited,
                ambiguity_scope: info
                    .is_ambiguous()
                    .then(|| info.ambiguity_scope.clone()),
            })
        })
        .collect()
}

fn edge_rows(model: &DocumentationModel, entity: EntityId) -> Vec<EdgeRow> {
    let bases = model.base_classes(entity).iter().map(|e| ("base", e));
    let derived = model.sub_classes(entity).iter().map(|e| ("derived", e));
    bases
        .chain(derived)
        .map(|(relation, edge)| EdgeRow {
            relation,
            class: model.name(edge.class).to_string(),
            protection: edge.protection.as_str(),
            virtualness: edge.virtualness.as_str(),
            template_spec: edge.template_spec.clone(),
            linkable: model.is_linkable(edge.class),
        })
        .collect()
}
