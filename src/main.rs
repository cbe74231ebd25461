//! wfg CLI - model, traverse and analyze a workflow entity graph.

use clap::Parser;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;
use workflow_graph::cli::{
    Cli, Commands, ConfigCommands, EntityCommands, GraphCommands, LinkCommands,
};
use workflow_graph::commands::{self, CommandResult, NewLink};
use workflow_graph::config::resolve_config;
use workflow_graph::graph::analysis::AnalysisMode;
use workflow_graph::graph::traversal::TraversalOptions;
use workflow_graph::storage::SnapshotFile;

/// Environment variable holding the log filter (e.g. `debug`, `workflow_graph=trace`).
const LOG_ENV: &str = "WFG_LOG";

fn main() {
    init_logging();

    let cli = Cli::parse();
    let human = cli.human_readable;

    let file = SnapshotFile::new(&cli.graph_path);
    let result = run_command(cli.command, &file, cli.config_path.as_deref(), human);

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        if human {
            eprintln!("Error: {}", e);
        } else {
            let err = serde_json::json!({ "error": e.to_string() });
            eprintln!("{}", err);
        }
        process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(
    command: Commands,
    file: &SnapshotFile,
    config_path: Option<&Path>,
    human: bool,
) -> Result<(), workflow_graph::Error> {
    match command {
        Commands::Init { force } => {
            let result = commands::init(file, force)?;
            output(&result, human);
        }

        Commands::Entity { command } => match command {
            EntityCommands::Add {
                title,
                entity_type,
                id,
                fields,
            } => {
                let result = commands::entity_add(file, title, entity_type, id, fields)?;
                output(&result, human);
            }
            EntityCommands::Update { id, title, fields } => {
                let result = commands::entity_update(file, &id, title, fields)?;
                output(&result, human);
            }
            EntityCommands::Remove { id } => {
                let result = commands::entity_remove(file, &id)?;
                output(&result, human);
            }
            EntityCommands::Show { id } => {
                let result = commands::entity_show(file, &id)?;
                output(&result, human);
            }
            EntityCommands::List { entity_type } => {
                let result = commands::entity_list(file, entity_type)?;
                output(&result, human);
            }
        },

        Commands::Link { command } => match command {
            LinkCommands::Add {
                source,
                target,
                relationship_type,
                id,
                strength,
                confidence,
                bidirectional,
                evidence,
            } => {
                let link = NewLink {
                    source,
                    target,
                    relationship_type,
                    id,
                    strength,
                    confidence,
                    bidirectional,
                    evidence,
                };
                let result = commands::link_add(file, link)?;
                output(&result, human);
            }
            LinkCommands::Update {
                id,
                relationship_type,
                strength,
                confidence,
                bidirectional,
                evidence,
            } => {
                let result = commands::link_update(
                    file,
                    &id,
                    relationship_type,
                    strength,
                    confidence,
                    bidirectional,
                    evidence,
                )?;
                output(&result, human);
            }
            LinkCommands::Remove { id } => {
                let result = commands::link_remove(file, &id)?;
                output(&result, human);
            }
            LinkCommands::Between {
                source,
                target,
                relationship_type,
            } => {
                let result = commands::link_between(file, &source, &target, relationship_type)?;
                output(&result, human);
            }
            LinkCommands::List { entity } => {
                let result = commands::link_list(file, entity.as_deref())?;
                output(&result, human);
            }
        },

        Commands::Traverse {
            start,
            direction,
            algorithm,
            depth,
            entity_types,
            relationship_types,
        } => {
            let options = TraversalOptions {
                direction,
                algorithm,
                max_depth: depth,
                entity_types: (!entity_types.is_empty()).then_some(entity_types),
                relationship_types: (!relationship_types.is_empty()).then_some(relationship_types),
            };
            let result = commands::traverse(file, &start, &options)?;
            output(&result, human);
        }

        Commands::Graph { command } => {
            let mode = match command {
                GraphCommands::Stats => {
                    let result = commands::graph_stats(file)?;
                    output(&result, human);
                    return Ok(());
                }
                GraphCommands::Components => AnalysisMode::Connectivity,
                GraphCommands::Centrality => AnalysisMode::Centrality,
                GraphCommands::Communities => AnalysisMode::Communities,
                GraphCommands::Dependencies => AnalysisMode::Dependencies,
            };
            let thresholds = resolve_config(config_path)?.value;
            let result = commands::graph_analysis(file, mode, &thresholds)?;
            output(&result, human);
        }

        Commands::Analyze {
            ids,
            scope,
            depth,
            as_of,
        } => {
            let thresholds = resolve_config(config_path)?.value;
            let result =
                commands::analyze(file, thresholds, ids, scope, depth, as_of.as_deref())?;
            output(&result, human);
        }

        Commands::Merge { other, policy } => {
            let result = commands::merge(file, &other, policy)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config_path)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
