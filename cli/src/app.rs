//! コマンドの実行。設定の解決、クライアントの構築、ユースケースの呼び出し、結果の表示を行う。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use protoreg_kafka::{ClusterMetadata, RdKafkaClusterMetadata};
use protoreg_schemaregistry::{HttpSchemaRegistryClient, SchemaRegistryClient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{Cli, Commands, ProtoArgs, RegistryArgs, TopicArgs};
use crate::domain::{VersionSpec, WorkflowOutcome};
use crate::infrastructure::config::{load_config, AppConfig};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::output::render;
use crate::usecase::{
    DeleteArgs, DeleteSchemaUseCase, ExportSchemaUseCase, InspectSchemaUseCase,
    ListSubjectsUseCase, ListVersionsUseCase, RegisterSchemaUseCase, SchemaSource,
    SchemaVersionArgs, SubjectArgs, ValidateSchemaUseCase,
};

/// 解析済みの引数でコマンドを 1 回実行する。
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log_settings(cli.log_level.as_deref(), cli.log_format))?;
    if let Some(path) = &config.ignored_file {
        warn!(
            "Config file {} is not a YAML mapping, using defaults",
            path.display()
        );
    }

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let (outcome, output) = dispatch(cli.command, &config, &cancel).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&outcome, &mut out, output.as_deref())
}

async fn dispatch(
    command: Commands,
    config: &AppConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<(WorkflowOutcome, Option<PathBuf>)> {
    let outcome = match command {
        Commands::Register(args) => {
            let source = read_source(&args)?;
            let uc = RegisterSchemaUseCase::new(
                registry_client(config, &args.registry)?,
                cluster_client(config, &args.cluster)?,
            );
            uc.execute(&source, cancel).await?
        }
        Commands::Validate(args) => {
            let source = read_source(&args)?;
            let uc = ValidateSchemaUseCase::new(
                registry_client(config, &args.registry)?,
                cluster_client(config, &args.cluster)?,
            );
            uc.execute(&source, cancel).await?
        }
        Commands::Delete {
            target,
            version,
            permanent,
        } => {
            let args = DeleteArgs {
                version: version.parse::<VersionSpec>()?,
                subject: subject_args(&target),
                permanent,
            };
            let uc = DeleteSchemaUseCase::new(registry_client(config, &target.registry)?);
            uc.execute(&args, cancel).await?
        }
        Commands::Versions { target } => {
            let uc = ListVersionsUseCase::new(registry_client(config, &target.registry)?);
            uc.execute(&subject_args(&target), cancel).await?
        }
        Commands::Inspect { target, version } => {
            let args = version_args(&target, &version)?;
            let uc = InspectSchemaUseCase::new(registry_client(config, &target.registry)?);
            uc.execute(&args, cancel).await?
        }
        Commands::Subjects { registry, topic } => {
            let uc = ListSubjectsUseCase::new(registry_client(config, &registry)?);
            uc.execute(&topic, cancel).await?
        }
        Commands::Export {
            target,
            version,
            output,
        } => {
            let args = version_args(&target, &version)?;
            let uc = ExportSchemaUseCase::new(registry_client(config, &target.registry)?);
            let outcome = uc.execute(&args, cancel).await?;
            return Ok((outcome, Some(output)));
        }
    };
    Ok((outcome, None))
}

fn read_source(args: &ProtoArgs) -> anyhow::Result<SchemaSource> {
    let proto = read_proto(&args.proto)?;
    Ok(SchemaSource {
        proto,
        topic: args.topic.clone(),
        record: Some(args.record.clone()),
    })
}

fn read_proto(path: &Path) -> anyhow::Result<Vec<u8>> {
    let proto = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("can not read proto file {}: {}", path.display(), e))?;
    debug!(path = %path.display(), bytes = proto.len(), "Read proto file");
    Ok(proto)
}

fn subject_args(target: &TopicArgs) -> SubjectArgs {
    SubjectArgs::new(target.topic.clone(), target.record.clone())
}

fn version_args(target: &TopicArgs, version: &str) -> anyhow::Result<SchemaVersionArgs> {
    Ok(SchemaVersionArgs {
        version: version.parse()?,
        subject: subject_args(target),
    })
}

fn registry_client(
    config: &AppConfig,
    args: &RegistryArgs,
) -> anyhow::Result<Arc<dyn SchemaRegistryClient>> {
    let registry_config = config.registry_config(args.schema_registry.as_deref());
    debug!(url = %registry_config.url, "Using Schema Registry");
    let client: Arc<dyn SchemaRegistryClient> =
        Arc::new(HttpSchemaRegistryClient::new(registry_config)?);
    Ok(client)
}

fn cluster_client(
    config: &AppConfig,
    brokers: &[String],
) -> anyhow::Result<Arc<dyn ClusterMetadata>> {
    let kafka_config = config.kafka_config(brokers)?;
    debug!(
        brokers = %kafka_config.bootstrap_servers(),
        tls = kafka_config.uses_tls(),
        "Using Kafka cluster"
    );
    let cluster: Arc<dyn ClusterMetadata> = Arc::new(RdKafkaClusterMetadata::new(kafka_config)?);
    Ok(cluster)
}

/// Ctrl-C でトークンをキャンセルし、実行中の呼び出しを打ち切る。
fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });
}
