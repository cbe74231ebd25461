//! CLI argument definitions for wfg.

use crate::graph::MergePolicy;
use crate::graph::traversal::{Algorithm, Direction};
use crate::models::{EntityType, RelationshipType};
use crate::reasoning::AnalysisScope;
use crate::storage::DEFAULT_GRAPH_FILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Version string with the commit and build time baked in by build.rs.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WFG_GIT_COMMIT"),
    ", built ",
    env!("WFG_BUILD_TIMESTAMP"),
    ")"
);

/// wfg - A workflow graph of notes, tasks, documents and projects.
///
/// Start with `wfg init`, add entities and links, then `wfg analyze`.
#[derive(Parser, Debug)]
#[command(name = "wfg")]
#[command(author, version = VERSION, about = "Model, traverse and analyze a workflow entity graph", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Snapshot file holding the graph.
    /// Can also be set via WFG_GRAPH environment variable.
    #[arg(short = 'g', long = "graph", global = true, env = "WFG_GRAPH", default_value = DEFAULT_GRAPH_FILE)]
    pub graph_path: PathBuf,

    /// Reasoning config file (overrides WFG_CONFIG and the system config.kdl)
    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty graph snapshot
    Init {
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Entity management commands
    Entity {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// Link management commands (relationships between entities)
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },

    /// Walk the graph from an entity
    Traverse {
        /// Entity ID to start from
        start: String,

        /// Edge direction: forward, backward or bidirectional
        #[arg(long, short = 'd', default_value = "forward")]
        direction: Direction,

        /// Walk order: breadth_first or depth_first
        #[arg(long, short = 'a', default_value = "breadth_first")]
        algorithm: Algorithm,

        /// Maximum number of hops from the start entity
        #[arg(long, default_value_t = 3)]
        depth: usize,

        /// Only report entities of this type (repeatable)
        #[arg(long = "entity-type")]
        entity_types: Vec<EntityType>,

        /// Only report relationships of this type (repeatable)
        #[arg(long = "relationship-type")]
        relationship_types: Vec<RelationshipType>,
    },

    /// Structural graph analysis commands
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },

    /// Run the reasoning pass over entities (the whole graph when no IDs are given)
    Analyze {
        /// Entity IDs to start from
        ids: Vec<String>,

        /// How to gather entities: selected, neighborhood, project or workflow
        #[arg(long, short = 's')]
        scope: Option<AnalysisScope>,

        /// Hop bound for neighborhood and project scopes
        #[arg(long, default_value_t = 2)]
        depth: usize,

        /// Reference time for due dates and staleness (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Merge another snapshot into this graph
    Merge {
        /// Snapshot file to merge in
        other: PathBuf,

        /// Collision policy: prefer_existing, prefer_new or merge
        #[arg(long, default_value = "prefer_existing")]
        policy: MergePolicy,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Optional entity fields shared by `entity add` and `entity update`.
#[derive(Args, Debug, Default, Clone)]
pub struct EntityFields {
    /// Body text
    #[arg(long)]
    pub content: Option<String>,

    /// Due date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Priority (1 = most urgent, 5 = least)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub priority: Option<u8>,

    /// Free-form status ("completed" and "done" mark it finished)
    #[arg(long)]
    pub status: Option<String>,

    /// Owning project ID
    #[arg(long)]
    pub project: Option<String>,

    /// Parent entity ID
    #[arg(long)]
    pub parent: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Metadata entry as key=value; JSON values are parsed (repeatable)
    #[arg(long = "meta")]
    pub metadata: Vec<String>,
}

/// Entity subcommands
#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// Add an entity
    #[command(visible_alias = "create")]
    Add {
        /// Title
        title: String,

        /// Entity type
        #[arg(long = "type", short = 't', default_value = "note")]
        entity_type: EntityType,

        /// Explicit ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        fields: EntityFields,
    },

    /// Update fields of an entity
    Update {
        /// Entity ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: EntityFields,
    },

    /// Remove an entity and every link touching it
    #[command(visible_alias = "rm")]
    Remove {
        /// Entity ID
        id: String,
    },

    /// Show an entity with its links
    Show {
        /// Entity ID
        id: String,
    },

    /// List entities
    List {
        /// Only list entities of this type
        #[arg(long = "type", short = 't')]
        entity_type: Option<EntityType>,
    },
}

/// Link subcommands
#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Create a link between two entities
    #[command(visible_alias = "create")]
    Add {
        /// Source entity ID
        source: String,
        /// Target entity ID
        target: String,
        /// Type of relationship
        #[arg(long = "type", short = 't')]
        relationship_type: RelationshipType,
        /// Explicit ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Strength in [0, 1]
        #[arg(long)]
        strength: Option<f64>,
        /// Confidence in [0, 1]
        #[arg(long)]
        confidence: Option<f64>,
        /// Walkable in both directions
        #[arg(long)]
        bidirectional: bool,
        /// Supporting evidence (repeatable)
        #[arg(long)]
        evidence: Vec<String>,
    },

    /// Update a link
    Update {
        /// Relationship ID
        id: String,
        /// New relationship type
        #[arg(long = "type", short = 't')]
        relationship_type: Option<RelationshipType>,
        /// New strength
        #[arg(long)]
        strength: Option<f64>,
        /// New confidence
        #[arg(long)]
        confidence: Option<f64>,
        /// Set or clear the bidirectional flag
        #[arg(long)]
        bidirectional: Option<bool>,
        /// Evidence to append (repeatable)
        #[arg(long)]
        evidence: Vec<String>,
    },

    /// Remove a link
    #[command(visible_alias = "rm")]
    Remove {
        /// Relationship ID
        id: String,
    },

    /// Find links from one entity to another
    Between {
        /// Source entity ID
        source: String,
        /// Target entity ID
        target: String,
        /// Only links of this type
        #[arg(long = "type", short = 't')]
        relationship_type: Option<RelationshipType>,
    },

    /// List links
    List {
        /// Only links touching this entity
        #[arg(long)]
        entity: Option<String>,
    },
}

/// Graph analysis subcommands
#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Entity and relationship counts, degree, density and components
    Stats,
    /// Disconnected components
    Components,
    /// Most connected entities
    Centrality,
    /// Per-component type mix and link strength
    Communities,
    /// Dependency links, critical ones and two-way cycles
    Dependencies,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved reasoning config and where it came from
    Show,
}
