//! Command dispatch
//!
//! Wires parsed arguments to providers and workflows and renders results.

use crate::cli::{
    AsstsCommand, Cli, Command, ConfigArgs, DelArgs, FilesCommand, GetArgs, OutputArgs,
    ThreadsCommand,
};
use crate::config::{parse_base_url, Config};
use crate::error::{OaitError, Result as OaitResult};
use crate::filter::Pipeline;
use crate::io;
use crate::openai::{
    Assistant, AssistantSpec, AssistantsApi, Conversation, FileObject, FileSpec, FilesApi,
    NewMessage, OpenAiClient, ThreadSpec, ThreadsApi, Transcript,
};
use crate::prompt::{AutoConfirm, Confirmer, StdinConfirmer};
use crate::resource::{create_one, ResourceProvider};
use crate::workflow::{bulk_delete, resolve_ids, select, BulkOptions};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Run one parsed command line against the loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let Cli {
        key,
        org,
        concurrency,
        command,
        ..
    } = cli;

    let command = match command {
        Command::Config(args) => return configure(config, key, org, args),
        other => other,
    };

    let concurrency = concurrency.or(config.max_concurrency);
    let client_config = config.client_config(key.as_deref(), org.as_deref())?;
    tracing::debug!("Using {:?}", client_config);
    let client = OpenAiClient::new(client_config)?;

    match command {
        Command::Assts(cmd) => assistants(AssistantsApi::new(client), cmd, concurrency).await,
        Command::Files(cmd) => files(FilesApi::new(client), cmd, concurrency).await,
        Command::Threads(cmd) => {
            let api = ThreadsApi::new(client).with_concurrency(concurrency);
            threads(api, cmd, concurrency).await
        }
        Command::Config(_) => Ok(()),
    }
}

fn configure(
    mut config: Config,
    key: Option<String>,
    org: Option<String>,
    args: ConfigArgs,
) -> Result<()> {
    let mut changed = false;

    if let Some(key) = key {
        config.api_key = Some(key);
        changed = true;
    }
    if let Some(org) = org {
        config.org_id = Some(org);
        changed = true;
    }
    if let Some(base_url) = args.base_url {
        parse_base_url(&base_url)?;
        config.base_url = Some(base_url);
        changed = true;
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = Some(n);
        changed = true;
    }

    if changed {
        config.save().context("Failed to save configuration")?;
        tracing::info!("Configuration saved");
    }

    let data = io::to_json(&config.redacted(), true)?;
    io::write_output(None, &data)?;
    Ok(())
}

async fn assistants(
    api: AssistantsApi,
    cmd: AsstsCommand,
    concurrency: Option<usize>,
) -> Result<()> {
    match cmd {
        AsstsCommand::Get(args) => {
            let pipeline = args.filters.assistant_pipeline()?;
            get(&api, &args, pipeline, concurrency, render_json::<Assistant>).await
        }
        AsstsCommand::Del(args) => {
            let pipeline = args.select.filters.assistant_pipeline()?;
            del(&api, &args, pipeline, concurrency, render_json::<Assistant>).await
        }
        AsstsCommand::Create { file, output } => {
            let spec: AssistantSpec = io::read_json(&file)?;
            let created = create_one(&api, &spec).await.context("Failed to create assistant")?;
            emit(&created, &output)
        }
    }
}

async fn files(api: FilesApi, cmd: FilesCommand, concurrency: Option<usize>) -> Result<()> {
    match cmd {
        FilesCommand::Get(args) => {
            let pipeline = args.filters.file_pipeline()?;
            get(&api, &args, pipeline, concurrency, render_json::<FileObject>).await
        }
        FilesCommand::Del(args) => {
            let pipeline = args.select.filters.file_pipeline()?;
            del(&api, &args, pipeline, concurrency, render_json::<FileObject>).await
        }
        FilesCommand::Create {
            path,
            purpose,
            output,
        } => {
            let spec = FileSpec { path, purpose };
            let created = create_one(&api, &spec)
                .await
                .with_context(|| format!("Failed to upload {}", spec.path.display()))?;
            emit(&created, &output)
        }
    }
}

async fn threads(api: ThreadsApi, cmd: ThreadsCommand, concurrency: Option<usize>) -> Result<()> {
    match cmd {
        ThreadsCommand::Get(args) => {
            let pipeline = args.filters.thread_pipeline()?;
            get(&api, &args, pipeline, concurrency, render_threads).await
        }
        ThreadsCommand::Del(args) => {
            let pipeline = args.select.filters.thread_pipeline()?;
            del(&api, &args, pipeline, concurrency, render_threads).await
        }
        ThreadsCommand::Create {
            messages,
            meta,
            output,
        } => {
            let spec = ThreadSpec {
                messages: messages
                    .iter()
                    .map(|m| parse_message(m))
                    .collect::<OaitResult<_>>()?,
                metadata: if meta.is_empty() {
                    None
                } else {
                    Some(crate::cli::parse_key_values(&meta)?)
                },
            };
            let created = create_one(&api, &spec).await.context("Failed to create thread")?;
            if output.pretty {
                emit(&created.transcript(), &output)
            } else {
                emit(&created, &output)
            }
        }
        ThreadsCommand::Add {
            thread_id,
            role,
            content,
            output,
        } => {
            let message = NewMessage { role, content };
            let posted = api
                .add_message(&thread_id, &message)
                .await
                .with_context(|| format!("Failed to add message to thread {}", thread_id))?;
            tracing::info!("Added message {} to thread {}", posted.id, thread_id);
            emit(&posted, &output)
        }
    }
}

/// Resolve, fetch, filter and print
async fn get<P, R>(
    provider: &P,
    args: &GetArgs,
    pipeline: Pipeline<P::Item>,
    concurrency: Option<usize>,
    render: R,
) -> Result<()>
where
    P: ResourceProvider,
    R: Fn(&[P::Item], bool) -> OaitResult<Vec<u8>>,
{
    let source = args.input.source()?;
    pipeline.validate()?;

    let ids = resolve_ids(provider, &source).await?;
    let selection = select(provider, &ids, &pipeline, concurrency).await?;

    let data = render(&selection.items, args.output.pretty)?;
    io::write_output(args.output.output.as_deref(), &data)?;
    Ok(())
}

/// Resolve, fetch, filter, confirm and delete
async fn del<P, R>(
    provider: &P,
    args: &DelArgs,
    pipeline: Pipeline<P::Item>,
    concurrency: Option<usize>,
    render: R,
) -> Result<()>
where
    P: ResourceProvider,
    R: Fn(&[P::Item], bool) -> OaitResult<Vec<u8>>,
{
    let source = args.select.input.source()?;
    pipeline.validate()?;

    let ids = resolve_ids(provider, &source).await?;
    let options = BulkOptions {
        concurrency,
        assume_yes: args.yes,
        verify: args.verify,
    };

    let mut confirmer: Box<dyn Confirmer> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirmer)
    };

    let report = bulk_delete(
        provider,
        &ids,
        &pipeline,
        &options,
        confirmer.as_mut(),
        |items| {
            let data = render(items, true)?;
            io::write_output(None, &data)?;
            Ok(())
        },
    )
    .await?;

    match &args.select.output.output {
        Some(path) => write_report(path, &report, args.select.output.pretty)?,
        None => eprintln!("{}", report),
    }
    Ok(())
}

fn write_report<T: Serialize>(path: &Path, report: &T, pretty: bool) -> OaitResult<()> {
    let data = io::to_json(report, pretty)?;
    io::write_output(Some(path), &data)
}

fn emit<T: Serialize>(value: &T, output: &OutputArgs) -> Result<()> {
    let data = io::to_json(value, output.pretty)?;
    io::write_output(output.output.as_deref(), &data)?;
    Ok(())
}

fn render_json<T: Serialize>(items: &[T], pretty: bool) -> OaitResult<Vec<u8>> {
    io::to_json(items, pretty)
}

/// Pretty thread output is a chronological transcript per thread
fn render_threads(items: &[Conversation], pretty: bool) -> OaitResult<Vec<u8>> {
    if pretty {
        let transcripts: Vec<Transcript> = items.iter().map(Conversation::transcript).collect();
        io::to_json(&transcripts, true)
    } else {
        io::to_json(items, false)
    }
}

/// Parse a `role=text` initial message
fn parse_message(raw: &str) -> OaitResult<NewMessage> {
    match raw.split_once('=') {
        Some((role, content)) if !role.trim().is_empty() && !content.is_empty() => Ok(NewMessage {
            role: role.trim().to_string(),
            content: content.to_string(),
        }),
        _ => Err(OaitError::Input(format!(
            "invalid message: '{}' (should be '<role>=<text>')",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::threads::{Message, Thread};
    use serde_json::Value;

    #[test]
    fn message_argument_splits_on_first_equals() {
        let message = parse_message("user=a=b").unwrap();
        assert_eq!(message.role, "user");
        assert_eq!(message.content, "a=b");
        assert!(parse_message("user").is_err());
        assert!(parse_message("=hello").is_err());
        assert!(parse_message("user=").is_err());
    }

    fn conversation() -> Conversation {
        let messages: Vec<Message> = serde_json::from_value(serde_json::json!([
            {"id": "m2", "created_at": 20, "role": "assistant",
             "content": [{"type": "text", "text": {"value": "hi there"}}]},
            {"id": "m1", "created_at": 10, "role": "user",
             "content": [{"type": "text", "text": {"value": "hello"}}]}
        ]))
        .unwrap();
        let thread: Thread =
            serde_json::from_value(serde_json::json!({"id": "thread_1", "created_at": 5})).unwrap();
        Conversation::new(thread, messages)
    }

    #[test]
    fn pretty_threads_render_as_transcripts() {
        let data = render_threads(&[conversation()], true).unwrap();
        let value: Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(value[0]["thread_id"], "thread_1");
        assert_eq!(value[0]["messages"][0]["text"], "hello");
        assert_eq!(value[0]["messages"][1]["role"], "assistant");
    }

    #[test]
    fn compact_threads_keep_full_objects() {
        let data = render_threads(&[conversation()], false).unwrap();
        let value: Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(value[0]["id"], "thread_1");
        assert_eq!(value[0]["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn invalid_base_url_is_not_saved() {
        let args = ConfigArgs {
            base_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(configure(Config::default(), None, None, args).is_err());
    }
}
