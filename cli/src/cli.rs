use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::DEFAULT_RECORD;
use crate::infrastructure::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "protoreg",
    version,
    about = "Keep Kafka topic Protobuf schemas in sync with Confluent Schema Registry"
)]
pub struct Cli {
    /// YAML config file; a file that is not a YAML mapping (e.g. dotenv) is ignored
    #[arg(long, env = "SCHEMA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive [default: info]
    #[arg(long, env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log output format [default: text]
    #[arg(long, env = "LOG_FORMAT", value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the proto schema under its topic subject
    Register(ProtoArgs),
    /// Check the proto schema against the latest registered version
    Validate(ProtoArgs),
    /// Delete a subject, or a single version of it
    Delete {
        #[command(flatten)]
        target: TopicArgs,

        /// Version number or "latest" (whole subject)
        #[arg(long, env = "VERSION", default_value = "latest")]
        version: String,

        /// Hard delete after soft delete
        #[arg(long, env = "PERMANENT", default_value_t = false)]
        permanent: bool,
    },
    /// List registered version numbers of a subject
    Versions {
        #[command(flatten)]
        target: TopicArgs,
    },
    /// Show id, version, references and body of a schema
    Inspect {
        #[command(flatten)]
        target: TopicArgs,

        /// Version number or "latest"
        #[arg(long, env = "VERSION", default_value = "latest")]
        version: String,
    },
    /// List subjects that belong to a topic
    Subjects {
        #[command(flatten)]
        registry: RegistryArgs,

        /// Kafka topic
        #[arg(long, env = "TOPIC")]
        topic: String,
    },
    /// Write a registered schema body to a file
    Export {
        #[command(flatten)]
        target: TopicArgs,

        /// Version number or "latest"
        #[arg(long, env = "VERSION", default_value = "latest")]
        version: String,

        /// Destination file
        #[arg(long, env = "OUTPUT")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Schema Registry URL [default: http://localhost:8081]
    #[arg(long = "sr", env = "SCHEMA_REGISTRY")]
    pub schema_registry: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ProtoArgs {
    /// Kafka brokers, comma separated [default: localhost:9092]
    #[arg(long, env = "CLUSTER", value_delimiter = ',')]
    pub cluster: Vec<String>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Kafka topic; read from the proto `(topic)` option when omitted
    #[arg(long, env = "TOPIC")]
    pub topic: Option<String>,

    /// Record name; an empty value reads both names from the proto
    #[arg(long, env = "RECORD", default_value = DEFAULT_RECORD)]
    pub record: String,

    /// Path to the .proto file
    #[arg(long, env = "PROTO")]
    pub proto: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TopicArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Kafka topic
    #[arg(long, env = "TOPIC")]
    pub topic: String,

    /// Record name
    #[arg(long, env = "RECORD", default_value = DEFAULT_RECORD)]
    pub record: String,
}
