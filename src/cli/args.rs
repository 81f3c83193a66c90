use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use tfinv::pipeline::{ExtractInput, TieBreak};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// Inventory store base URL
    #[arg(long, global = true, env = "TFINV_STORE_URL")]
    pub store_url: Option<String>,

    #[arg(long, global = true, env = "TFINV_STORE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read source resources from a JSON file instead of the store and print
    /// the records that would be written. Takes precedence over --store-url
    #[arg(long, global = true)]
    pub inventory_file: Option<PathBuf>,

    #[arg(long, global = true, env = "TFINV_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract one resource type from a located Terraform state
    Extract(ExtractArgs),
    /// Run several extraction jobs from a JSON file concurrently
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Type of the records written to the inventory
    #[arg(long)]
    pub resource_type: String,

    /// Type of the source resource holding the state
    #[arg(long)]
    pub src_resource_type: Option<String>,

    /// Terraform resource type matched in the state
    #[arg(long)]
    pub terraform_type: Option<String>,

    /// Terraform block name to keep
    #[arg(long, default_value = "null")]
    pub resource_name: String,

    #[arg(long, alias = "mode", default_value = "null")]
    pub terraform_mode: String,

    #[arg(long, default_value = "null")]
    pub vpc: String,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub must_exists: bool,

    #[arg(long, env = "TFINV_PROVIDER", default_value = "null")]
    pub provider: String,

    /// Raw lookup criteria as a JSON object; replaces the individual fields
    #[arg(long = "match", default_value = "null")]
    pub match_override: String,

    #[arg(long, default_value = "null")]
    pub id: String,

    /// Comma-separated Terraform block names to keep
    #[arg(long, default_value = "null")]
    pub filter_names: String,

    /// JSON object of values set on every record
    #[arg(long, default_value = "null")]
    pub add_values: String,

    /// JSON object of `source_key: target_key` copies
    #[arg(long, default_value = "null")]
    pub mapping: String,

    #[arg(long, default_value = "null")]
    pub labels: String,

    #[arg(long, default_value = "null")]
    pub tags: String,

    #[arg(long, env = "TFINV_CLUSTER")]
    pub cluster: Option<String>,

    #[arg(long, env = "TFINV_INSTANCE")]
    pub instance: Option<String>,

    #[arg(long, env = "TFINV_SCHEDULE_ID")]
    pub schedule_id: Option<String>,

    #[arg(long, env = "TFINV_JOB_INSTANCE_ID")]
    pub job_instance_id: Option<String>,

    #[arg(long, env = "TFINV_RUN_ID")]
    pub run_id: Option<String>,

    /// Fail instead of taking the first source when several match
    #[arg(long)]
    pub strict_match: bool,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// JSON array of extraction jobs
    pub jobs: PathBuf,
}

impl From<ExtractArgs> for ExtractInput {
    fn from(args: ExtractArgs) -> Self {
        ExtractInput {
            resource_type: args.resource_type,
            src_resource_type: args.src_resource_type,
            terraform_type: args.terraform_type,
            resource_name: Some(args.resource_name),
            terraform_mode: Some(args.terraform_mode),
            vpc: Some(args.vpc),
            must_exists: Some(args.must_exists),
            provider: Some(args.provider),
            match_override: Some(Value::String(args.match_override)),
            id: Some(args.id),
            filter_names: Some(Value::String(args.filter_names)),
            add_values: Some(Value::String(args.add_values)),
            mapping: Some(Value::String(args.mapping)),
            labels: Some(Value::String(args.labels)),
            tags: Some(Value::String(args.tags)),
            cluster: args.cluster,
            instance: args.instance,
            schedule_id: args.schedule_id,
            job_instance_id: args.job_instance_id,
            run_id: args.run_id,
            tie_break: Some(if args.strict_match {
                TieBreak::Error
            } else {
                TieBreak::First
            }),
        }
    }
}
