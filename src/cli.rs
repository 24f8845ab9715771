//! Command-line interface
//!
//! Argument model and the translation of filter flags into typed pipelines.

use crate::error::{OaitError, Result};
use crate::filter::{
    ContainsContent, ContainsName, DaysGt, DaysLte, HasContent, HasCreatedAt, HasLength,
    HasMetadata, HasName, LengthGt, LengthLte, MetadataEquals, NotContainsContent,
    NotContainsName, Pipeline,
};
use crate::openai::{Assistant, Conversation, FileObject};
use crate::resource::ResourceKind;
use crate::workflow::IdSource;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::Level;

/// OpenAI tools: bulk fetch, filter and delete assistants, files and threads
#[derive(Parser, Debug)]
#[command(name = "oait", version, about, long_about = None)]
pub struct Cli {
    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Organization ID sent with every request
    #[arg(short = 'O', long, global = true)]
    pub org: Option<String>,

    /// Maximum concurrent requests per batch (unbounded when unset)
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assistant tools
    #[command(subcommand)]
    Assts(AsstsCommand),
    /// File tools
    #[command(subcommand)]
    Files(FilesCommand),
    /// Thread tools
    #[command(subcommand)]
    Threads(ThreadsCommand),
    /// Show the saved configuration, updating it with any values given
    Config(ConfigArgs),
}

/// Values persisted by `oait config`; `--key` and `--org` are saved too
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// API root to use instead of the public endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Default cap on in-flight requests per batch
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum AsstsCommand {
    /// Retrieve and filter assistants
    Get(GetArgs),
    /// Delete assistants matching the filters
    Del(DelArgs),
    /// Create an assistant from a JSON spec
    Create {
        /// JSON file holding the assistant definition
        #[arg(short, long)]
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// Retrieve and filter files
    Get(GetArgs),
    /// Delete files matching the filters
    Del(DelArgs),
    /// Upload a file
    Create {
        /// Local file to upload
        #[arg(long)]
        path: PathBuf,
        /// Intended purpose (assistants, fine-tune, batch, vision, ...)
        #[arg(long, default_value = "assistants")]
        purpose: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThreadsCommand {
    /// Retrieve and filter threads
    Get(GetArgs),
    /// Delete threads matching the filters
    Del(DelArgs),
    /// Create a thread
    Create {
        /// Initial message as role=text, repeatable
        #[arg(long = "message")]
        messages: Vec<String>,
        /// Metadata as key=value, repeatable
        #[arg(short, long = "meta")]
        meta: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Add a message to a thread
    Add {
        /// Thread to post to
        thread_id: String,
        /// Message role
        #[arg(short, long, default_value = "user")]
        role: String,
        /// Message text
        #[arg(short, long)]
        content: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// IDs to process (space or comma separated)
    #[arg(short, long, num_args = 1..)]
    pub ids: Vec<String>,

    /// File of IDs (.txt one per line, or .json)
    #[arg(short = 'f', long = "file")]
    pub file_input: Option<PathBuf>,

    /// Every item the API lists for this key
    #[arg(short, long)]
    pub all: bool,

    /// Threads listed under this session token (the key stays in use for
    /// fetching and deleting them)
    #[arg(short, long)]
    pub session: Option<String>,
}

impl InputArgs {
    pub fn source(&self) -> Result<IdSource> {
        let mut sources = Vec::new();
        if !self.ids.is_empty() {
            sources.push(IdSource::List(self.ids.clone()));
        }
        if let Some(path) = &self.file_input {
            sources.push(IdSource::File(path.clone()));
        }
        if let Some(token) = &self.session {
            sources.push(IdSource::Session(token.clone()));
        }
        if self.all {
            sources.push(IdSource::All);
        }

        let mut sources = sources.into_iter();
        match (sources.next(), sources.next()) {
            (Some(source), None) => Ok(source),
            (None, _) => Err(OaitError::Input(
                "no input given: use --ids, --file, --session or --all".to_string(),
            )),
            _ => Err(OaitError::Input(
                "--ids, --file, --session and --all are mutually exclusive".to_string(),
            )),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write results to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty output (transcripts for threads)
    #[arg(short, long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep items from the last N days
    #[arg(short = 'd', long = "days", allow_negative_numbers = true)]
    pub days_lte: Option<f64>,

    /// Keep items older than N days
    #[arg(short = 'D', long = "older-than", allow_negative_numbers = true)]
    pub days_gt: Option<f64>,

    /// Keep items with at most N elements
    #[arg(short = 'l', long = "length", allow_negative_numbers = true)]
    pub length_lte: Option<i64>,

    /// Keep items with more than N elements
    #[arg(short = 'L', long = "longer-than", allow_negative_numbers = true)]
    pub length_gt: Option<i64>,

    /// Keep items whose name contains all of these
    #[arg(short = 'n', long = "name", num_args = 1..)]
    pub name: Vec<String>,

    /// Keep items whose name contains none of these
    #[arg(short = 'N', long = "not-name", num_args = 1..)]
    pub not_name: Vec<String>,

    /// Keep items whose content contains all of these
    #[arg(short = 'c', long = "content", num_args = 1..)]
    pub content: Vec<String>,

    /// Keep items whose content contains none of these
    #[arg(short = 'C', long = "not-content", num_args = 1..)]
    pub not_content: Vec<String>,

    /// Keep items whose metadata has key=value, repeatable
    #[arg(short = 'm', long = "meta", num_args = 1..)]
    pub meta: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GetArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DelArgs {
    #[command(flatten)]
    pub select: GetArgs,

    /// Delete without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Show matched items before the confirmation prompt
    #[arg(long)]
    pub verify: bool,
}

/// Parse `key=value` pairs; the value may itself contain `=`
pub fn parse_key_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => Err(OaitError::Input(format!(
                "invalid metadata: '{}' (should be '<key>=<value>')",
                pair
            ))),
        })
        .collect()
}

impl FilterArgs {
    fn push_time<T: HasCreatedAt>(&self, pipeline: &mut Pipeline<T>) {
        if let Some(days) = self.days_lte {
            pipeline.push(DaysLte::new(days));
        }
        if let Some(days) = self.days_gt {
            pipeline.push(DaysGt::new(days));
        }
    }

    fn push_length<T: HasLength>(&self, pipeline: &mut Pipeline<T>) {
        if let Some(n) = self.length_lte {
            pipeline.push(LengthLte(n));
        }
        if let Some(n) = self.length_gt {
            pipeline.push(LengthGt(n));
        }
    }

    fn push_name<T: HasName>(&self, pipeline: &mut Pipeline<T>) {
        if !self.name.is_empty() {
            pipeline.push(ContainsName(self.name.clone()));
        }
        if !self.not_name.is_empty() {
            pipeline.push(NotContainsName(self.not_name.clone()));
        }
    }

    fn push_content<T: HasContent>(&self, pipeline: &mut Pipeline<T>) {
        if !self.content.is_empty() {
            pipeline.push(ContainsContent(self.content.clone()));
        }
        if !self.not_content.is_empty() {
            pipeline.push(NotContainsContent(self.not_content.clone()));
        }
    }

    fn push_metadata<T: HasMetadata>(&self, pipeline: &mut Pipeline<T>) -> Result<()> {
        if !self.meta.is_empty() {
            pipeline.push(MetadataEquals(parse_key_values(&self.meta)?));
        }
        Ok(())
    }

    fn uses_length(&self) -> bool {
        self.length_lte.is_some() || self.length_gt.is_some()
    }

    fn uses_name(&self) -> bool {
        !self.name.is_empty() || !self.not_name.is_empty()
    }

    fn uses_content(&self) -> bool {
        !self.content.is_empty() || !self.not_content.is_empty()
    }

    fn uses_metadata(&self) -> bool {
        !self.meta.is_empty()
    }

    fn unsupported(kind: ResourceKind, filter: &str) -> OaitError {
        OaitError::Input(format!("{} filters are not supported for {}", filter, kind.plural()))
    }

    /// Time, name, content and metadata filters
    pub fn assistant_pipeline(&self) -> Result<Pipeline<Assistant>> {
        if self.uses_length() {
            return Err(Self::unsupported(ResourceKind::Assistant, "length"));
        }

        let mut pipeline = Pipeline::new();
        self.push_time(&mut pipeline);
        self.push_name(&mut pipeline);
        self.push_content(&mut pipeline);
        self.push_metadata(&mut pipeline)?;
        Ok(pipeline)
    }

    /// Time and name filters
    pub fn file_pipeline(&self) -> Result<Pipeline<FileObject>> {
        if self.uses_length() {
            return Err(Self::unsupported(ResourceKind::File, "length"));
        }
        if self.uses_content() {
            return Err(Self::unsupported(ResourceKind::File, "content"));
        }
        if self.uses_metadata() {
            return Err(Self::unsupported(ResourceKind::File, "metadata"));
        }

        let mut pipeline = Pipeline::new();
        self.push_time(&mut pipeline);
        self.push_name(&mut pipeline);
        Ok(pipeline)
    }

    /// Time, length, content and metadata filters
    pub fn thread_pipeline(&self) -> Result<Pipeline<Conversation>> {
        if self.uses_name() {
            return Err(Self::unsupported(ResourceKind::Thread, "name"));
        }

        let mut pipeline = Pipeline::new();
        self.push_time(&mut pipeline);
        self.push_length(&mut pipeline);
        self.push_content(&mut pipeline);
        self.push_metadata(&mut pipeline)?;
        Ok(pipeline)
    }
}
