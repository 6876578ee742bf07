//! Schema command handler

use super::utils;
use crate::cli::SchemaArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use omi_schemas::{
    CallerRepository, DocumentReport, ResolutionCache, ResolverConfig, SchemaResolver, SchemaValidator,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Handle the schema command
#[instrument(skip(config, output), fields(file = %args.schema.display()))]
pub fn handle_schema(args: SchemaArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("schema_command", &args.schema.display().to_string());
    output.info(&format!("Validating schema template: {}", args.schema.display()))?;
    utils::ensure_exists(&args.schema)?;

    let remote = utils::remote(config)?;
    let manifests = utils::manifests(config, &remote, args.offline)?;
    let registry = Arc::new(manifests.registry()?);

    let schema_root = args
        .schema_root
        .clone()
        .unwrap_or_else(|| config.paths.schema_root.clone());
    let mut resolver_config =
        ResolverConfig::new(schema_root).with_content_api_base(config.sources.content_api_base.clone());
    if let (Some(repository), Some(branch)) = (&args.repository, &args.branch) {
        info!(repository = %repository, branch = %branch, "Binding schema to its home repository");
        resolver_config = resolver_config.with_caller(CallerRepository::new(repository, branch));
    }

    let resolver = SchemaResolver::new(registry, remote, Arc::new(ResolutionCache::new()), resolver_config);
    let validator = SchemaValidator::new(&args.schema, &resolver);
    let report = DocumentReport::run(&args.schema, &validator);

    let stats = resolver.cache().stats();
    debug!(hits = stats.hits, misses = stats.misses, "Resolution cache");

    utils::finish(&[report], output)
}
